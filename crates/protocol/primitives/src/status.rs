//! Lifecycle states of cross-chain messages.

/// The status of an L1 -> L2 retryable ticket.
///
/// ```text
/// NotYetCreated -> CreationFailed
///               -> FundsDepositedOnL2 -> Redeemed
///                                     -> Expired
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum L1ToL2MessageStatus {
    /// The retryable ticket has not been created on L2 yet.
    #[display("NOT_YET_CREATED")]
    NotYetCreated = 1,
    /// An attempt was made to create the ticket, but it failed. This can happen when the
    /// submission cost is too low.
    #[display("CREATION_FAILED")]
    CreationFailed = 2,
    /// The ticket exists and funds were deposited on L2, but it has not been redeemed yet.
    #[display("FUNDS_DEPOSITED_ON_L2")]
    FundsDepositedOnL2 = 3,
    /// The ticket was redeemed and its L2 transaction executed.
    #[display("REDEEMED")]
    Redeemed = 4,
    /// The ticket expired before being redeemed.
    #[display("EXPIRED")]
    Expired = 5,
}

impl L1ToL2MessageStatus {
    /// Returns `true` if no further transition can happen.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::CreationFailed | Self::Redeemed | Self::Expired)
    }

    /// Returns `true` if the lifecycle can move from `self` to `next`.
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::NotYetCreated, Self::CreationFailed | Self::FundsDepositedOnL2)
                | (Self::NotYetCreated, Self::Redeemed | Self::Expired)
                | (Self::FundsDepositedOnL2, Self::Redeemed | Self::Expired)
        )
    }
}

/// The status of an ETH deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum EthDepositStatus {
    /// The deposit has not been credited on L2 yet.
    #[display("PENDING")]
    Pending = 1,
    /// The deposit was credited on L2.
    #[display("DEPOSITED")]
    Deposited = 2,
}

/// The status of an L2 -> L1 message.
///
/// Ordered: a message only ever moves forward through these states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum L2ToL1MessageStatus {
    /// The rollup node asserting the message has not been confirmed yet.
    #[display("UNCONFIRMED")]
    Unconfirmed = 0,
    /// The message is confirmed and can be executed on L1.
    #[display("CONFIRMED")]
    Confirmed = 1,
    /// The message was executed on L1.
    #[display("EXECUTED")]
    Executed = 2,
}
