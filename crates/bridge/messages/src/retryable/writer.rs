//! Actions on a nitro retryable ticket.

use crate::{
    BridgeProvider, BridgeSigner, L1ToL2MessageReader, L2TransactionReceipt, MessageError,
    RedeemTransaction, TxOverrides, TxReceipt, contract::contract_call,
};
use alloy_sol_types::SolCall;
use arb_bindings::{IArbRetryableTx, addresses::ARB_RETRYABLE_TX};
use arb_primitives::L1ToL2MessageStatus;
use std::sync::Arc;

/// A retryable ticket bound to a signer on L2.
///
/// Every action requires the ticket to be [`L1ToL2MessageStatus::FundsDepositedOnL2`].
#[derive(Debug, Clone, derive_more::Deref)]
pub struct L1ToL2MessageWriter<P> {
    #[deref]
    reader: L1ToL2MessageReader<P>,
    signer: Arc<dyn BridgeSigner>,
}

impl<P: BridgeProvider + Clone> L1ToL2MessageWriter<P> {
    /// Binds `reader` to `signer`.
    pub fn new(reader: L1ToL2MessageReader<P>, signer: Arc<dyn BridgeSigner>) -> Self {
        Self { reader, signer }
    }

    /// The underlying reader.
    pub const fn reader(&self) -> &L1ToL2MessageReader<P> {
        &self.reader
    }

    /// The signer actions are sent with.
    pub const fn signer(&self) -> &Arc<dyn BridgeSigner> {
        &self.signer
    }

    /// Manually redeems the ticket.
    pub async fn redeem(
        &self,
        overrides: &TxOverrides,
    ) -> Result<RedeemTransaction<P>, MessageError> {
        let call = IArbRetryableTx::redeemCall { ticketId: self.retryable_creation_id() };
        let receipt = self.send(&call, overrides).await?;
        Ok(RedeemTransaction::new(L2TransactionReceipt::from(receipt), self.provider().clone()))
    }

    /// Cancels the ticket, refunding the call value to the beneficiary.
    pub async fn cancel(&self, overrides: &TxOverrides) -> Result<TxReceipt, MessageError> {
        let call = IArbRetryableTx::cancelCall { ticketId: self.retryable_creation_id() };
        self.send(&call, overrides).await
    }

    /// Extends the lifetime of the ticket by another lifetime period.
    pub async fn keep_alive(&self, overrides: &TxOverrides) -> Result<TxReceipt, MessageError> {
        let call = IArbRetryableTx::keepaliveCall { ticketId: self.retryable_creation_id() };
        self.send(&call, overrides).await
    }

    async fn send<C: SolCall>(
        &self,
        call: &C,
        overrides: &TxOverrides,
    ) -> Result<TxReceipt, MessageError> {
        let status = self.status().await?;
        if status != L1ToL2MessageStatus::FundsDepositedOnL2 {
            return Err(MessageError::UnexpectedRetryableStatus {
                expected: L1ToL2MessageStatus::FundsDepositedOnL2,
                actual: status,
            });
        }
        let tx = overrides.apply(contract_call(ARB_RETRYABLE_TX, call), self.signer.address());
        tracing::info!(
            target: "l1_to_l2",
            ticket = %self.retryable_creation_id(),
            action = C::SIGNATURE,
            "sending retryable action"
        );
        Ok(self.signer.send_transaction(tx).await?)
    }
}
