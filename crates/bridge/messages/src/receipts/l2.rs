//! Receipts of transactions executed on an Arbitrum chain.

use crate::{
    BlockRangeCache, BridgeProvider, L2ToL1Message, MessageError, MessageHandle, PollConfig,
    ProviderError, TxReceipt, WithdrawalEvent, contract::read_contract, events::parse_typed_logs,
    poll::poll_until, receipts::get_transaction_receipt,
};
use arb_bindings::{
    IArbRetryableTx, IArbSys, INodeInterface,
    addresses::{ARB_RETRYABLE_TX, ARB_SYS, NODE_INTERFACE},
};
use arb_primitives::ArbitrumNetwork;

/// A receipt of a transaction executed on an Arbitrum chain.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Deref, derive_more::From)]
pub struct L2TransactionReceipt {
    receipt: TxReceipt,
}

impl L2TransactionReceipt {
    /// Returns the plain receipt.
    pub fn into_inner(self) -> TxReceipt {
        self.receipt
    }

    /// Returns the withdrawals initiated by the transaction, classic ones first.
    pub fn get_l2_to_l1_events(&self) -> Result<Vec<WithdrawalEvent>, ProviderError> {
        let classic = parse_typed_logs::<IArbSys::L2ToL1Transaction>(&self.logs, Some(ARB_SYS))?;
        let nitro = parse_typed_logs::<IArbSys::L2ToL1Tx>(&self.logs, Some(ARB_SYS))?;
        Ok(classic
            .into_iter()
            .map(WithdrawalEvent::Classic)
            .chain(nitro.into_iter().map(WithdrawalEvent::Nitro))
            .collect())
    }

    /// Returns the redeems scheduled by the transaction.
    pub fn get_redeem_scheduled_events(
        &self,
    ) -> Result<Vec<IArbRetryableTx::RedeemScheduled>, ProviderError> {
        parse_typed_logs(&self.logs, Some(ARB_RETRYABLE_TX))
    }

    /// Returns the withdrawals initiated by the transaction, bound to the parent chain through
    /// `parent`.
    pub fn get_l2_to_l1_messages<P>(
        &self,
        parent: MessageHandle<P>,
        l2_provider: P,
        network: &ArbitrumNetwork,
        cache: &BlockRangeCache,
    ) -> Result<Vec<L2ToL1Message<P>>, MessageError>
    where
        P: BridgeProvider + Clone,
    {
        Ok(self
            .get_l2_to_l1_events()?
            .into_iter()
            .map(|event| {
                L2ToL1Message::from_event(
                    parent.clone(),
                    l2_provider.clone(),
                    network,
                    event,
                    cache.clone(),
                )
            })
            .collect())
    }

    /// Returns the number of parent chain confirmations of the batch holding the transaction.
    pub async fn batch_confirmations<P>(&self, l2_provider: &P) -> Result<u64, MessageError>
    where
        P: BridgeProvider + ?Sized,
    {
        let call = INodeInterface::getL1ConfirmationsCall { blockHash: self.block_hash };
        Ok(read_contract(l2_provider, NODE_INTERFACE, call).await?)
    }

    /// Returns the number of the batch holding the transaction.
    ///
    /// Fails while the transaction has not been posted to the parent chain.
    pub async fn batch_number<P>(&self, l2_provider: &P) -> Result<u64, MessageError>
    where
        P: BridgeProvider + ?Sized,
    {
        let call = INodeInterface::findBatchContainingBlockCall { blockNum: self.block_number };
        Ok(read_contract(l2_provider, NODE_INTERFACE, call).await?)
    }

    /// Returns `true` once the batch holding the transaction has more than `confirmations`
    /// parent chain confirmations.
    pub async fn is_data_available<P>(
        &self,
        l2_provider: &P,
        confirmations: u64,
    ) -> Result<bool, MessageError>
    where
        P: BridgeProvider + ?Sized,
    {
        Ok(self.batch_confirmations(l2_provider).await? > confirmations)
    }
}

/// A manual redeem of a retryable ticket.
#[derive(Debug, Clone)]
pub struct RedeemTransaction<P> {
    receipt: L2TransactionReceipt,
    provider: P,
}

impl<P: BridgeProvider> RedeemTransaction<P> {
    /// Wraps the receipt of a `redeem` call.
    pub const fn new(receipt: L2TransactionReceipt, provider: P) -> Self {
        Self { receipt, provider }
    }

    /// The receipt of the `redeem` call.
    pub const fn receipt(&self) -> &L2TransactionReceipt {
        &self.receipt
    }

    /// Waits for the retry transaction scheduled by the redeem and returns its receipt.
    pub async fn wait_for_redeem(&self, poll: &PollConfig) -> Result<TxReceipt, MessageError> {
        let events = self.receipt.get_redeem_scheduled_events()?;
        let [event] = events.as_slice() else {
            return Err(MessageError::NotARedeemTransaction(self.receipt.transaction_hash));
        };
        let retry = event.retryTxHash;
        tracing::debug!(target: "l1_to_l2", ticket = %event.ticketId, %retry, "waiting for redeem");
        poll_until(poll, || async {
            Ok(get_transaction_receipt(&self.provider, retry, None).await?)
        })
        .await
    }
}
