//! Error types for the message tracking crate.

use alloy_eips::BlockId;
use alloy_primitives::{B256, Bytes, U256, hex};
use alloy_sol_types::SolError;
use arb_primitives::{L1ToL2MessageStatus, L2ToL1MessageStatus, ParseError};
use core::time::Duration;
use thiserror::Error;

/// An error returned by a [`crate::BridgeProvider`] or [`crate::BridgeSigner`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The call reverted.
    #[error("execution reverted: {message}")]
    Reverted {
        /// The message returned by the node.
        message: String,
        /// The raw revert data, if the node returned it.
        data: Option<Bytes>,
    },
    /// The request did not reach the node, or the node failed to answer it.
    #[error("transport error: {0}")]
    Transport(String),
    /// The response could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Returns the decoded revert reason, falling back to the node's message.
    pub fn revert_reason(&self) -> Option<String> {
        match self {
            Self::Reverted { message, data } => data
                .as_ref()
                .and_then(|data| alloy_sol_types::decode_revert_reason(data))
                .or_else(|| Some(message.clone())),
            _ => None,
        }
    }

    /// Returns `true` if the call reverted with the custom error `E`.
    pub fn is_custom_error<E: SolError>(&self) -> bool {
        match self {
            Self::Reverted { data: Some(data), .. } => data.starts_with(&E::SELECTOR),
            // Some nodes only report the selector in the message.
            Self::Reverted { message, data: None } => {
                message.contains(&hex::encode_prefixed(E::SELECTOR)) ||
                    message.contains(E::SIGNATURE)
            }
            _ => false,
        }
    }

    /// Returns `true` if the call reverted with a reason containing `needle`.
    pub fn reverted_with(&self, needle: &str) -> bool {
        self.revert_reason().is_some_and(|reason| reason.contains(needle))
    }

    /// Returns `true` for transport level failures.
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Errors raised while resolving or acting on bridge messages.
#[derive(Debug, Error)]
pub enum MessageError {
    /// A provider call failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// An event payload could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The bridge and inbox events of a receipt do not pair up.
    #[error("unexpected missing events: {inbox} inbox events, {bridge} bridge events")]
    MissingEvents {
        /// Number of `InboxMessageDelivered` events.
        inbox: usize,
        /// Number of `MessageDelivered` events.
        bridge: usize,
    },
    /// A bridge message has no inbox event with the same message number.
    #[error("unexpected missing inbox event for message {0}")]
    MissingInboxEvent(U256),
    /// A creation receipt carries more than one `RedeemScheduled` event.
    #[error("unexpected number of RedeemScheduled events: expected 0 or 1, got {0}")]
    MultipleRedeemsScheduled(usize),
    /// More than one redeem of a ticket succeeded.
    #[error("unexpected number of successful redeems for ticket {ticket}: expected 0 or 1, got {count}")]
    MultipleSuccessfulRedeems {
        /// The retryable ticket id.
        ticket: B256,
        /// The number of successful redeems found.
        count: usize,
    },
    /// A transaction expected to redeem a ticket did not schedule exactly one redeem.
    #[error("transaction {0} is not a redeem transaction")]
    NotARedeemTransaction(B256),
    /// A writer action requires a different ticket status.
    #[error("retryable must be {expected} to perform this action, but was {actual}")]
    UnexpectedRetryableStatus {
        /// The required status.
        expected: L1ToL2MessageStatus,
        /// The current status.
        actual: L1ToL2MessageStatus,
    },
    /// An action requires a different withdrawal status.
    #[error("message must be {expected} to perform this action, but was {actual}")]
    UnexpectedWithdrawalStatus {
        /// The required status.
        expected: L2ToL1MessageStatus,
        /// The current status.
        actual: L2ToL1MessageStatus,
    },
    /// A nitro-only operation was called on a classic receipt.
    #[error("transaction {0} predates nitro, use the classic message readers")]
    ClassicTransaction(B256),
    /// A classic-only operation was called on a nitro receipt.
    #[error("transaction {0} was processed by nitro, use the nitro message readers")]
    NitroTransaction(B256),
    /// The creation receipt of a ticket did not show up in time.
    #[error("timed out waiting to retrieve retryable creation receipt: {0}")]
    CreationReceiptTimeout(B256),
    /// A block could not be found.
    #[error("block {0:?} not found")]
    BlockNotFound(BlockId),
    /// The L2 block referenced by a rollup node does not match the node's assertion.
    #[error("L2 block send root {actual} does not match the asserted send root {expected}")]
    SendRootMismatch {
        /// The send root asserted by the node.
        expected: B256,
        /// The send root of the L2 block.
        actual: B256,
    },
    /// A block used to price a ticket carries no base fee.
    #[error("block {0} has no base fee")]
    MissingBaseFee(u64),
    /// The rollup has not created a node covering the message yet.
    #[error("node not yet created, cannot get proof")]
    NodeNotCreated,
    /// The outbox proof of a confirmed classic message is unavailable.
    #[error("unexpected missing proof for batch {batch}, index {index}")]
    MissingProof {
        /// The classic batch number.
        batch: U256,
        /// The index in the batch.
        index: U256,
    },
    /// No classic outbox serves the batch of a classic withdrawal.
    #[error("no classic outbox serves batch {0}")]
    NoClassicOutbox(U256),
    /// A node number matched more than one `NodeCreated` event.
    #[error("unexpected number of NodeCreated events for node {node}: expected 0 or 1, got {count}")]
    MultipleNodeCreatedEvents {
        /// The node number.
        node: u64,
        /// The number of events found.
        count: usize,
    },
    /// A fully indexed classic withdrawal query matched more than one event.
    #[error("more than one indexed item found in batch: {0}")]
    DuplicateClassicWithdrawal(usize),
    /// A wait did not complete in time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// A wait was cancelled.
    #[error("cancelled")]
    Cancelled,
}
