//! Withdrawals sent before the nitro upgrade.

use crate::{
    BridgeProvider, MessageError, PollConfig, contract::{contract_call, read_contract},
    poll::poll_until,
};
use alloy_primitives::{Address, U256};
use arb_bindings::{IClassicOutbox, INodeInterface, addresses::NODE_INTERFACE};
use arb_primitives::{ArbitrumNetwork, L2ToL1MessageStatus};
use tokio::sync::OnceCell;

/// The proof and payload of a classic withdrawal, as stored by the node.
pub type MessageBatchProofInfo = INodeInterface::legacyLookupMessageBatchProofReturn;

/// A classic withdrawal, identified by its batch and its index in the batch.
///
/// Classic withdrawals are executed against the classic outbox serving their batch.
#[derive(Debug, Clone)]
pub struct ClassicL2ToL1MessageReader<P> {
    l1_provider: P,
    l2_provider: P,
    batch_number: U256,
    index_in_batch: U256,
    outbox: Option<Address>,
    proof: OnceCell<MessageBatchProofInfo>,
}

impl<P: BridgeProvider> ClassicL2ToL1MessageReader<P> {
    /// Creates a reader for the withdrawal at `index_in_batch` in batch `batch_number`.
    pub fn new(
        l1_provider: P,
        l2_provider: P,
        network: &ArbitrumNetwork,
        batch_number: U256,
        index_in_batch: U256,
    ) -> Self {
        Self {
            l1_provider,
            l2_provider,
            batch_number,
            index_in_batch,
            outbox: network.classic_outbox_for_batch(batch_number),
            proof: OnceCell::new(),
        }
    }

    /// The batch holding the withdrawal.
    pub const fn batch_number(&self) -> U256 {
        self.batch_number
    }

    /// The index of the withdrawal in its batch.
    pub const fn index_in_batch(&self) -> U256 {
        self.index_in_batch
    }

    /// The classic outbox serving the batch.
    pub fn outbox_address(&self) -> Result<Address, MessageError> {
        self.outbox.ok_or(MessageError::NoClassicOutbox(self.batch_number))
    }

    /// Returns `true` once the outbox holds the batch.
    pub async fn outbox_entry_exists(&self) -> Result<bool, MessageError> {
        let call = IClassicOutbox::outboxEntryExistsCall { batchNum: self.batch_number };
        Ok(read_contract(&self.l1_provider, self.outbox_address()?, call).await?)
    }

    /// Returns the proof of the withdrawal, or `None` while the node does not know the batch.
    pub async fn try_get_proof(&self) -> Result<Option<MessageBatchProofInfo>, MessageError> {
        if let Some(proof) = self.proof.get() {
            return Ok(Some(proof.clone()));
        }
        let call = INodeInterface::legacyLookupMessageBatchProofCall {
            batchNum: self.batch_number,
            index: self.index_in_batch.saturating_to(),
        };
        match read_contract(&self.l2_provider, NODE_INTERFACE, call).await {
            Ok(proof) => {
                let _ = self.proof.set(proof.clone());
                Ok(Some(proof))
            }
            Err(err) if err.reverted_with("batch doesn't exist") => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Returns `true` if the withdrawal was executed, by simulating its execution.
    pub async fn has_executed(&self) -> Result<bool, MessageError> {
        let Some(proof) = self.try_get_proof().await? else {
            return Ok(false);
        };
        let call = execute_call(self.batch_number, proof);
        match self.l1_provider.call(contract_call(self.outbox_address()?, &call)).await {
            Ok(_) => Ok(false),
            Err(err) if err.reverted_with("ALREADY_SPENT") => Ok(true),
            Err(err) if err.reverted_with("NO_OUTBOX_ENTRY") => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Returns the current status of the withdrawal.
    pub async fn status(&self) -> Result<L2ToL1MessageStatus, MessageError> {
        if self.has_executed().await? {
            return Ok(L2ToL1MessageStatus::Executed);
        }
        Ok(if self.outbox_entry_exists().await? {
            L2ToL1MessageStatus::Confirmed
        } else {
            L2ToL1MessageStatus::Unconfirmed
        })
    }

    /// Waits for the outbox to hold the batch, then returns the status of the withdrawal.
    pub async fn wait_until_outbox_entry_created(
        &self,
        poll: &PollConfig,
    ) -> Result<L2ToL1MessageStatus, MessageError> {
        poll_until(poll, || async { Ok(self.outbox_entry_exists().await?.then_some(())) }).await?;
        Ok(if self.has_executed().await? {
            L2ToL1MessageStatus::Executed
        } else {
            L2ToL1MessageStatus::Confirmed
        })
    }

    /// Classic withdrawals are executable as soon as their batch is in the outbox.
    pub const fn get_first_executable_block(&self) -> Option<u64> {
        None
    }

    /// Builds the outbox call executing the withdrawal.
    pub(crate) async fn execute_call(&self) -> Result<IClassicOutbox::executeTransactionCall, MessageError> {
        let proof = self.try_get_proof().await?.ok_or(MessageError::MissingProof {
            batch: self.batch_number,
            index: self.index_in_batch,
        })?;
        Ok(execute_call(self.batch_number, proof))
    }
}

fn execute_call(
    batch_number: U256,
    proof: MessageBatchProofInfo,
) -> IClassicOutbox::executeTransactionCall {
    IClassicOutbox::executeTransactionCall {
        batchNum: batch_number,
        proof: proof.proof,
        index: proof.path,
        l2Sender: proof.l2Sender,
        destAddr: proof.l1Dest,
        l2Block: proof.l2Block,
        l1Block: proof.l1Block,
        l2Timestamp: proof.timestamp,
        amount: proof.amount,
        calldataForL1: proof.calldataForL1,
    }
}
