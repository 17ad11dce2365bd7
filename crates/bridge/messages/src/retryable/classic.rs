//! Read-only view of a retryable ticket created before the nitro upgrade.

use crate::{
    BridgeProvider, MessageError, TxReceipt, receipts::get_transaction_receipt,
};
use alloy_primitives::{B256, U256};
use arb_primitives::{
    L1ToL2MessageStatus, auto_redeem_id, classic_retryable_creation_id, retryable_l2_tx_hash,
};
use tokio::sync::OnceCell;

/// A classic retryable ticket.
///
/// Classic tickets are identified by the chain id and the inbox message number alone. Every
/// classic ticket was either redeemed or expired before the migration, so no ticket is ever
/// reported as still pending.
#[derive(Debug, Clone)]
pub struct ClassicL1ToL2MessageReader<P> {
    provider: P,
    message_number: U256,
    retryable_creation_id: B256,
    auto_redeem_id: B256,
    l2_tx_hash: B256,
    creation_receipt: OnceCell<TxReceipt>,
}

impl<P: BridgeProvider> ClassicL1ToL2MessageReader<P> {
    /// Creates a reader for the ticket delivered as `message_number` on chain `chain_id`.
    pub fn new(provider: P, chain_id: u64, message_number: U256) -> Self {
        let retryable_creation_id = classic_retryable_creation_id(chain_id, message_number);
        Self {
            provider,
            message_number,
            retryable_creation_id,
            auto_redeem_id: auto_redeem_id(retryable_creation_id),
            l2_tx_hash: retryable_l2_tx_hash(retryable_creation_id),
            creation_receipt: OnceCell::new(),
        }
    }

    /// The inbox message number.
    pub const fn message_number(&self) -> U256 {
        self.message_number
    }

    /// The hash of the transaction that created the ticket.
    pub const fn retryable_creation_id(&self) -> B256 {
        self.retryable_creation_id
    }

    /// The hash of the auto-redeem attempt.
    pub const fn auto_redeem_id(&self) -> B256 {
        self.auto_redeem_id
    }

    /// The hash of the L2 transaction executed by the ticket.
    pub const fn l2_tx_hash(&self) -> B256 {
        self.l2_tx_hash
    }

    /// Returns the creation receipt, if the ticket was created.
    pub async fn get_retryable_creation_receipt(
        &self,
        confirmations: Option<u64>,
    ) -> Result<Option<TxReceipt>, MessageError> {
        if let Some(receipt) = self.creation_receipt.get() {
            return Ok(Some(receipt.clone()));
        }
        let receipt =
            get_transaction_receipt(&self.provider, self.retryable_creation_id, confirmations)
                .await?;
        if let Some(receipt) = &receipt {
            let _ = self.creation_receipt.set(receipt.clone());
        }
        Ok(receipt)
    }

    /// Returns the receipt of the L2 transaction executed by the ticket.
    pub async fn get_l2_tx_receipt(&self) -> Result<Option<TxReceipt>, MessageError> {
        Ok(get_transaction_receipt(&self.provider, self.l2_tx_hash, None).await?)
    }

    /// Returns the current status of the ticket.
    pub async fn status(&self) -> Result<L1ToL2MessageStatus, MessageError> {
        let Some(creation) = self.get_retryable_creation_receipt(None).await? else {
            return Ok(L1ToL2MessageStatus::NotYetCreated);
        };
        if !creation.status {
            return Ok(L1ToL2MessageStatus::CreationFailed);
        }
        let status = match self.get_l2_tx_receipt().await? {
            Some(receipt) if receipt.status => L1ToL2MessageStatus::Redeemed,
            _ => L1ToL2MessageStatus::Expired,
        };
        tracing::debug!(target: "l1_to_l2", ticket = %self.retryable_creation_id, %status, "resolved classic retryable");
        Ok(status)
    }
}
