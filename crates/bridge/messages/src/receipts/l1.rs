//! Receipts of transactions executed on the parent chain.

use crate::{
    BridgeProvider, ClassicL1ToL2MessageReader, EthDepositMessage, L1ToL2Message, MessageError,
    MessageHandle, PollConfig, ProviderError, TxReceipt, events::parse_typed_logs,
};
use arb_bindings::{IBridge, IInbox};
use arb_primitives::{
    ArbitrumNetwork, InboxMessageKind, L1ToL2MessageStatus, RetryableMessageParams,
};

/// The bridge and inbox events recording a single delivered message.
#[derive(Debug, Clone)]
pub struct MessageEvents {
    /// The event emitted by the bridge.
    pub bridge: IBridge::MessageDelivered,
    /// The event emitted by the inbox, carrying the payload.
    pub inbox: IInbox::InboxMessageDelivered,
}

impl MessageEvents {
    fn is(&self, kind: InboxMessageKind, network: &ArbitrumNetwork) -> bool {
        self.bridge.kind == kind as u8 && self.bridge.inbox == network.eth_bridge.inbox
    }
}

/// The L2 messages created by a parent chain transaction.
///
/// A transaction is either processed by the classic or by the nitro protocol, never both.
#[derive(Debug, Clone)]
pub enum ChildMessages<P> {
    /// Tickets created before the nitro upgrade.
    Classic(Vec<ClassicL1ToL2MessageReader<P>>),
    /// Tickets created by nitro.
    Nitro(Vec<L1ToL2Message<P>>),
}

/// The outcome of waiting for a retryable ticket.
#[derive(Debug, Clone)]
pub struct L1ToL2WaitResult<P> {
    /// The ticket.
    pub message: L1ToL2Message<P>,
    /// `true` if the ticket was redeemed.
    pub complete: bool,
    /// The ticket status.
    pub status: L1ToL2MessageStatus,
    /// The receipt of the successful redeem.
    pub l2_tx_receipt: Option<TxReceipt>,
}

/// The outcome of waiting for an ETH deposit.
#[derive(Debug, Clone)]
pub struct EthDepositWaitResult<P> {
    /// The deposit.
    pub message: EthDepositMessage<P>,
    /// `true` if the deposit was credited before the wait timed out.
    pub complete: bool,
    /// The receipt of the crediting transaction.
    pub l2_tx_receipt: Option<TxReceipt>,
}

/// A receipt of a transaction executed on the parent chain of an Arbitrum chain.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Deref, derive_more::From)]
pub struct L1TransactionReceipt {
    receipt: TxReceipt,
}

impl L1TransactionReceipt {
    /// Returns the plain receipt.
    pub fn into_inner(self) -> TxReceipt {
        self.receipt
    }

    /// Returns `true` if the transaction was included before `network` migrated to nitro.
    pub const fn is_classic(&self, network: &ArbitrumNetwork) -> bool {
        network.is_classic(self.receipt.block_number)
    }

    /// Returns the `MessageDelivered` events emitted by any bridge.
    pub fn message_delivered_events(&self) -> Result<Vec<IBridge::MessageDelivered>, ProviderError> {
        parse_typed_logs(&self.logs, None)
    }

    /// Returns the `InboxMessageDelivered` events emitted by any inbox.
    pub fn inbox_message_delivered_events(
        &self,
    ) -> Result<Vec<IInbox::InboxMessageDelivered>, ProviderError> {
        parse_typed_logs(&self.logs, None)
    }

    /// Pairs every bridge event with the inbox event of the same message number.
    pub fn message_events(&self) -> Result<Vec<MessageEvents>, MessageError> {
        let bridge = self.message_delivered_events()?;
        let inbox = self.inbox_message_delivered_events()?;
        if bridge.len() != inbox.len() {
            return Err(MessageError::MissingEvents { inbox: inbox.len(), bridge: bridge.len() });
        }
        bridge
            .into_iter()
            .map(|bridge| {
                let inbox = inbox
                    .iter()
                    .find(|inbox| inbox.messageNum == bridge.messageIndex)
                    .cloned()
                    .ok_or(MessageError::MissingInboxEvent(bridge.messageIndex))?;
                Ok(MessageEvents { bridge, inbox })
            })
            .collect()
    }

    /// Returns the ETH deposits made into `network` by the transaction.
    pub fn get_eth_deposits<P>(
        &self,
        l2_provider: P,
        network: &ArbitrumNetwork,
    ) -> Result<Vec<EthDepositMessage<P>>, MessageError>
    where
        P: BridgeProvider + Clone,
    {
        self.message_events()?
            .into_iter()
            .filter(|m| m.is(InboxMessageKind::EthDeposit, network))
            .map(|m| {
                Ok(EthDepositMessage::from_event_components(
                    l2_provider.clone(),
                    network,
                    m.inbox.messageNum,
                    m.bridge.sender,
                    &m.inbox.data,
                )?)
            })
            .collect()
    }

    /// Returns the nitro retryable tickets created in `network` by the transaction.
    pub fn get_l1_to_l2_messages<P>(
        &self,
        l2: MessageHandle<P>,
        network: &ArbitrumNetwork,
    ) -> Result<Vec<L1ToL2Message<P>>, MessageError>
    where
        P: BridgeProvider + Clone,
    {
        if self.is_classic(network) {
            return Err(MessageError::ClassicTransaction(self.transaction_hash));
        }
        self.message_events()?
            .into_iter()
            .filter(|m| m.is(InboxMessageKind::SubmitRetryableTx, network))
            .map(|m| {
                let params = RetryableMessageParams::decode(&m.inbox.data)?;
                Ok(L1ToL2Message::from_event_components(
                    l2.clone(),
                    network,
                    m.bridge.sender,
                    m.inbox.messageNum,
                    m.bridge.baseFeeL1,
                    params,
                ))
            })
            .collect()
    }

    /// Returns the classic retryable tickets created in `network` by the transaction.
    pub fn get_classic_l1_to_l2_messages<P>(
        &self,
        l2_provider: P,
        network: &ArbitrumNetwork,
    ) -> Result<Vec<ClassicL1ToL2MessageReader<P>>, MessageError>
    where
        P: BridgeProvider + Clone,
    {
        if !self.is_classic(network) {
            return Err(MessageError::NitroTransaction(self.transaction_hash));
        }
        Ok(self
            .inbox_message_delivered_events()?
            .into_iter()
            .map(|event| {
                ClassicL1ToL2MessageReader::new(l2_provider.clone(), network.chain_id, event.messageNum)
            })
            .collect())
    }

    /// Returns the retryable tickets created by the transaction, in the protocol era it was
    /// processed by.
    pub fn child_messages<P>(
        &self,
        l2: MessageHandle<P>,
        network: &ArbitrumNetwork,
    ) -> Result<ChildMessages<P>, MessageError>
    where
        P: BridgeProvider + Clone,
    {
        if self.is_classic(network) {
            let provider = l2.provider().clone();
            Ok(ChildMessages::Classic(self.get_classic_l1_to_l2_messages(provider, network)?))
        } else {
            Ok(ChildMessages::Nitro(self.get_l1_to_l2_messages(l2, network)?))
        }
    }

    /// Waits for every nitro ticket created by the transaction to be resolved on L2.
    pub async fn wait_for_l2<P>(
        &self,
        l2: MessageHandle<P>,
        network: &ArbitrumNetwork,
        confirmations: Option<u64>,
        poll: &PollConfig,
    ) -> Result<Vec<L1ToL2WaitResult<P>>, MessageError>
    where
        P: BridgeProvider + Clone,
    {
        let mut results = Vec::new();
        for message in self.get_l1_to_l2_messages(l2, network)? {
            let res = message.wait_for_status(confirmations, poll).await?;
            results.push(L1ToL2WaitResult {
                complete: res.status == L1ToL2MessageStatus::Redeemed,
                status: res.status,
                l2_tx_receipt: res.l2_tx_receipt,
                message,
            });
        }
        Ok(results)
    }

    /// Waits for every ETH deposit made by the transaction to be credited on L2.
    ///
    /// A deposit not credited before the wait times out is reported as incomplete.
    pub async fn wait_for_eth_deposits<P>(
        &self,
        l2_provider: P,
        network: &ArbitrumNetwork,
        confirmations: Option<u64>,
        poll: &PollConfig,
    ) -> Result<Vec<EthDepositWaitResult<P>>, MessageError>
    where
        P: BridgeProvider + Clone,
    {
        let mut results = Vec::new();
        for message in self.get_eth_deposits(l2_provider, network)? {
            let l2_tx_receipt = match message.wait(confirmations, poll).await {
                Ok(receipt) => Some(receipt),
                Err(MessageError::Timeout(_)) => None,
                Err(err) => return Err(err),
            };
            results.push(EthDepositWaitResult {
                complete: l2_tx_receipt.is_some(),
                l2_tx_receipt,
                message,
            });
        }
        Ok(results)
    }
}
