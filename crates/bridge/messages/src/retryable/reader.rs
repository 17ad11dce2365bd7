//! Read-only view of a nitro retryable ticket.

use crate::{
    BridgeProvider, EventFetcher, EventFilter, L2TransactionReceipt, MessageError, PollConfig,
    TxReceipt, contract::read_contract, poll::poll_until, receipts::get_transaction_receipt,
};
use alloy_eips::BlockId;
use alloy_primitives::{Address, B256, U256};
use arb_bindings::{IArbRetryableTx, addresses::ARB_RETRYABLE_TX};
use arb_primitives::{
    ArbitrumNetwork, L1ToL2MessageStatus, RetryableMessageParams, SECONDS_PER_DAY,
    submit_retryable_id,
};
use futures::future::try_join_all;
use std::collections::VecDeque;
use tokio::sync::OnceCell;

/// Number of blocks covered by the first window of the redeem scan.
pub(crate) const INITIAL_SCAN_INCREMENT: u64 = 1000;

/// Resizes the scan window so that the next one covers roughly a day.
pub(crate) fn next_increment(increment: u64, processed_seconds: u64) -> u64 {
    if processed_seconds == 0 {
        return increment;
    }
    let scaled = (u128::from(increment) * u128::from(SECONDS_PER_DAY))
        .div_ceil(u128::from(processed_seconds));
    u64::try_from(scaled).unwrap_or(u64::MAX).max(1)
}

/// The resolved state of a retryable ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemResult {
    /// The ticket status.
    pub status: L1ToL2MessageStatus,
    /// The receipt of the successful redeem, set iff the status is
    /// [`L1ToL2MessageStatus::Redeemed`].
    pub l2_tx_receipt: Option<TxReceipt>,
}

impl RedeemResult {
    const fn status(status: L1ToL2MessageStatus) -> Self {
        Self { status, l2_tx_receipt: None }
    }

    const fn redeemed(receipt: TxReceipt) -> Self {
        Self { status: L1ToL2MessageStatus::Redeemed, l2_tx_receipt: Some(receipt) }
    }
}

/// A retryable ticket submitted through the inbox after the nitro upgrade.
///
/// The identity of the ticket is fixed at construction. The creation receipt is fetched lazily
/// and kept once found.
#[derive(Debug, Clone)]
pub struct L1ToL2MessageReader<P> {
    provider: P,
    network: ArbitrumNetwork,
    sender: Address,
    message_number: U256,
    l1_base_fee: U256,
    params: RetryableMessageParams,
    retryable_creation_id: B256,
    creation_receipt: OnceCell<TxReceipt>,
}

impl<P: BridgeProvider + Clone> L1ToL2MessageReader<P> {
    /// Creates a reader for the ticket delivered as `message_number` by `sender`.
    pub fn new(
        provider: P,
        network: &ArbitrumNetwork,
        sender: Address,
        message_number: U256,
        l1_base_fee: U256,
        params: RetryableMessageParams,
    ) -> Self {
        let retryable_creation_id =
            submit_retryable_id(network.chain_id, sender, message_number, l1_base_fee, &params);
        Self {
            provider,
            network: network.clone(),
            sender,
            message_number,
            l1_base_fee,
            params,
            retryable_creation_id,
            creation_receipt: OnceCell::new(),
        }
    }

    /// The id of the L2 transaction creating the ticket. Also the ticket id.
    pub const fn retryable_creation_id(&self) -> B256 {
        self.retryable_creation_id
    }

    /// The bridge message number.
    pub const fn message_number(&self) -> U256 {
        self.message_number
    }

    /// The sender recorded by the bridge.
    pub const fn sender(&self) -> Address {
        self.sender
    }

    /// The parent chain base fee at submission.
    pub const fn l1_base_fee(&self) -> U256 {
        self.l1_base_fee
    }

    /// The ticket parameters.
    pub const fn params(&self) -> &RetryableMessageParams {
        &self.params
    }

    /// The L2 network.
    pub const fn network(&self) -> &ArbitrumNetwork {
        &self.network
    }

    /// The L2 provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Returns the receipt of the ticket creation, if the ticket was created.
    ///
    /// With `confirmations`, a receipt with fewer confirmations is reported as absent.
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

    /// Returns the receipt of the auto-redeem attempt made at creation, if there was one.
    pub async fn get_auto_redeem_attempt(&self) -> Result<Option<TxReceipt>, MessageError> {
        let Some(creation) = self.get_retryable_creation_receipt(None).await? else {
            return Ok(None);
        };
        let events = L2TransactionReceipt::from(creation).get_redeem_scheduled_events()?;
        match events.as_slice() {
            [] => Ok(None),
            [event] => Ok(self.provider.transaction_receipt(event.retryTxHash).await?),
            _ => Err(MessageError::MultipleRedeemsScheduled(events.len())),
        }
    }

    /// Returns `true` while the ticket exists on L2.
    pub async fn retryable_exists(&self) -> Result<bool, MessageError> {
        let now = self.block(BlockId::latest()).await?.timestamp;
        match self.get_timeout().await {
            Ok(timeout) => Ok(U256::from(now) <= timeout),
            Err(MessageError::Provider(err))
                if err.is_custom_error::<IArbRetryableTx::NoTicketWithID>() =>
            {
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Returns the timestamp the ticket expires at.
    pub async fn get_timeout(&self) -> Result<U256, MessageError> {
        let call = IArbRetryableTx::getTimeoutCall { ticketId: self.retryable_creation_id };
        Ok(read_contract(&self.provider, ARB_RETRYABLE_TX, call).await?)
    }

    /// Returns the address receiving the call value if the ticket is cancelled or expires.
    pub async fn get_beneficiary(&self) -> Result<Address, MessageError> {
        let call = IArbRetryableTx::getBeneficiaryCall { ticketId: self.retryable_creation_id };
        Ok(read_contract(&self.provider, ARB_RETRYABLE_TX, call).await?)
    }

    /// Returns the lifetime of newly created tickets, in seconds.
    pub async fn get_lifetime(&self) -> Result<U256, MessageError> {
        Ok(read_contract(&self.provider, ARB_RETRYABLE_TX, IArbRetryableTx::getLifetimeCall {})
            .await?)
    }

    /// Returns the current status of the ticket.
    pub async fn status(&self) -> Result<L1ToL2MessageStatus, MessageError> {
        Ok(self.get_successful_redeem().await?.status)
    }

    /// Resolves the ticket status, along with the receipt of its successful redeem.
    pub async fn get_successful_redeem(&self) -> Result<RedeemResult, MessageError> {
        let Some(creation) = self.get_retryable_creation_receipt(None).await? else {
            return Ok(RedeemResult::status(L1ToL2MessageStatus::NotYetCreated));
        };
        if !creation.status {
            return Ok(RedeemResult::status(L1ToL2MessageStatus::CreationFailed));
        }
        if let Some(auto_redeem) = self.get_auto_redeem_attempt().await? {
            if auto_redeem.status {
                return Ok(RedeemResult::redeemed(auto_redeem));
            }
        }
        if self.retryable_exists().await? {
            return Ok(RedeemResult::status(L1ToL2MessageStatus::FundsDepositedOnL2));
        }
        self.scan_for_redeem(&creation).await
    }

    /// Walks the chain from the creation block looking for a successful manual redeem.
    ///
    /// The ticket no longer exists, so it was either redeemed or it expired. Windows are scanned
    /// in increasing block order and resized to cover about a day each. Once a window ends past
    /// the expiry, keepalive extensions found in the scanned windows push the expiry back.
    async fn scan_for_redeem(&self, creation: &TxReceipt) -> Result<RedeemResult, MessageError> {
        let fetcher = EventFetcher::new(self.provider.clone());
        let ticket = self.retryable_creation_id;
        let mut increment = INITIAL_SCAN_INCREMENT;
        let mut from = self.block(BlockId::number(creation.block_number)).await?;
        let mut timeout = from.timestamp + self.network.retryable_lifetime_seconds;
        let mut queried = VecDeque::new();
        let max_block = self.provider.block_number().await?;

        while from.number < max_block {
            let to_number = from.number.saturating_add(increment).min(max_block);
            queried.push_back((from.number, to_number));

            let filter =
                EventFilter::new(from.number, to_number).address(ARB_RETRYABLE_TX).topic(1, ticket);
            let redeems =
                fetcher.get_events::<IArbRetryableTx::RedeemScheduled>(&filter).await?;
            let receipts = try_join_all(
                redeems.iter().map(|r| self.provider.transaction_receipt(r.event.retryTxHash)),
            )
            .await?;
            let mut successful: Vec<_> = receipts.into_iter().flatten().filter(|r| r.status).collect();
            if successful.len() > 1 {
                return Err(MessageError::MultipleSuccessfulRedeems {
                    ticket,
                    count: successful.len(),
                });
            }
            if let Some(receipt) = successful.pop() {
                tracing::debug!(target: "l1_to_l2", %ticket, tx = %receipt.transaction_hash, "found manual redeem");
                return Ok(RedeemResult::redeemed(receipt));
            }

            let to = self.block(BlockId::number(to_number)).await?;
            if to.timestamp > timeout {
                while let Some((start, end)) = queried.pop_front() {
                    let filter =
                        EventFilter::new(start, end).address(ARB_RETRYABLE_TX).topic(1, ticket);
                    let extensions =
                        fetcher.get_events::<IArbRetryableTx::LifetimeExtended>(&filter).await?;
                    if let Some(extended) = extensions.iter().map(|e| e.event.newTimeout).max() {
                        timeout = extended.saturating_to();
                        tracing::debug!(target: "l1_to_l2", %ticket, timeout, "lifetime extended");
                        break;
                    }
                }
                if to.timestamp > timeout {
                    break;
                }
                while queried.len() > 1 {
                    queried.pop_front();
                }
            }

            increment = next_increment(increment, to.timestamp.saturating_sub(from.timestamp));
            from = to;
        }

        Ok(RedeemResult::status(L1ToL2MessageStatus::Expired))
    }

    /// Waits for the ticket to be created, then resolves its status.
    ///
    /// The wait is bounded by the network deposit timeout unless `poll` sets its own.
    pub async fn wait_for_status(
        &self,
        confirmations: Option<u64>,
        poll: &PollConfig,
    ) -> Result<RedeemResult, MessageError> {
        let poll = poll.or_timeout(self.network.deposit_timeout);
        poll_until(&poll, || self.get_retryable_creation_receipt(confirmations)).await.map_err(
            |err| match err {
                MessageError::Timeout(_) => {
                    MessageError::CreationReceiptTimeout(self.retryable_creation_id)
                }
                err => err,
            },
        )?;
        let result = self.get_successful_redeem().await?;
        tracing::debug!(target: "l1_to_l2", ticket = %self.retryable_creation_id, status = %result.status, "resolved retryable");
        Ok(result)
    }

    async fn block(&self, id: BlockId) -> Result<crate::ArbBlock, MessageError> {
        self.provider.block(id).await?.ok_or(MessageError::BlockNotFound(id))
    }
}
