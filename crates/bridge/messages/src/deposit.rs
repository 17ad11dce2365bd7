//! ETH deposits.

use crate::{
    BridgeProvider, MessageError, PollConfig, TxReceipt, poll::poll_until,
    receipts::get_transaction_receipt,
};
use alloy_primitives::{Address, B256, U256};
use arb_primitives::{ArbitrumNetwork, EthDepositData, EthDepositStatus, ParseError, deposit_tx_id};
use core::time::Duration;
use tokio::sync::OnceCell;

/// An ETH deposit into an Arbitrum chain.
#[derive(Debug, Clone)]
pub struct EthDepositMessage<P> {
    provider: P,
    chain_id: u64,
    deposit_timeout: Duration,
    message_number: U256,
    from: Address,
    to: Address,
    value: U256,
    l2_deposit_tx_hash: B256,
    l2_deposit_tx_receipt: OnceCell<TxReceipt>,
}

impl<P: BridgeProvider> EthDepositMessage<P> {
    /// Creates a deposit of `value` from `from` to `to`.
    pub fn new(
        provider: P,
        network: &ArbitrumNetwork,
        message_number: U256,
        from: Address,
        to: Address,
        value: U256,
    ) -> Self {
        Self {
            l2_deposit_tx_hash: deposit_tx_id(network.chain_id, message_number, from, to, value),
            provider,
            chain_id: network.chain_id,
            deposit_timeout: network.deposit_timeout,
            message_number,
            from,
            to,
            value,
            l2_deposit_tx_receipt: OnceCell::new(),
        }
    }

    /// Builds the deposit from the `InboxMessageDelivered` payload.
    pub fn from_event_components(
        provider: P,
        network: &ArbitrumNetwork,
        message_number: U256,
        from: Address,
        payload: &[u8],
    ) -> Result<Self, ParseError> {
        let EthDepositData { to, value } = EthDepositData::decode(payload)?;
        Ok(Self::new(provider, network, message_number, from, to, value))
    }

    /// The L2 chain id.
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// The bridge message number.
    pub const fn message_number(&self) -> U256 {
        self.message_number
    }

    /// The depositor, as recorded by the bridge.
    pub const fn from(&self) -> Address {
        self.from
    }

    /// The recipient on L2.
    pub const fn to(&self) -> Address {
        self.to
    }

    /// The deposited amount.
    pub const fn value(&self) -> U256 {
        self.value
    }

    /// The hash of the L2 transaction crediting the deposit.
    pub const fn l2_deposit_tx_hash(&self) -> B256 {
        self.l2_deposit_tx_hash
    }

    /// Returns whether the deposit was credited on L2.
    pub async fn status(&self) -> Result<EthDepositStatus, MessageError> {
        let receipt = self.provider.transaction_receipt(self.l2_deposit_tx_hash).await?;
        Ok(if receipt.is_some() { EthDepositStatus::Deposited } else { EthDepositStatus::Pending })
    }

    /// Waits for the deposit to be credited on L2 and returns the receipt.
    ///
    /// The wait is bounded by the network deposit timeout unless `poll` sets its own.
    pub async fn wait(
        &self,
        confirmations: Option<u64>,
        poll: &PollConfig,
    ) -> Result<TxReceipt, MessageError> {
        if let Some(receipt) = self.l2_deposit_tx_receipt.get() {
            return Ok(receipt.clone());
        }
        let poll = poll.or_timeout(self.deposit_timeout);
        let receipt = poll_until(&poll, || async {
            Ok(get_transaction_receipt(&self.provider, self.l2_deposit_tx_hash, confirmations)
                .await?)
        })
        .await?;
        tracing::debug!(target: "eth_deposit", tx = %self.l2_deposit_tx_hash, block = receipt.block_number, "deposit credited");
        let _ = self.l2_deposit_tx_receipt.set(receipt.clone());
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TestBridgeProvider, receipt};
    use alloy_primitives::address;
    use arb_primitives::network_by_chain_id;

    fn deposit(provider: &TestBridgeProvider) -> EthDepositMessage<TestBridgeProvider> {
        let mut payload = address!("0x3333333333333333333333333333333333333333").to_vec();
        payload.extend_from_slice(&U256::from(5u64).to_be_bytes::<32>());
        EthDepositMessage::from_event_components(
            provider.clone(),
            network_by_chain_id(42161).unwrap(),
            U256::from(12u64),
            address!("0x4444444444444444444444444444444444444444"),
            &payload,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_pending_then_deposited() {
        let provider = TestBridgeProvider::new(42161, 100);
        let deposit = deposit(&provider);
        assert_eq!(deposit.to(), address!("0x3333333333333333333333333333333333333333"));
        assert_eq!(deposit.value(), U256::from(5u64));
        assert_eq!(deposit.status().await.unwrap(), EthDepositStatus::Pending);

        provider.add_receipt(receipt(deposit.l2_deposit_tx_hash(), 90, true, vec![]));
        assert_eq!(deposit.status().await.unwrap(), EthDepositStatus::Deposited);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_cached_receipt() {
        let provider = TestBridgeProvider::new(42161, 100);
        let deposit = deposit(&provider);
        provider.add_receipt(receipt(deposit.l2_deposit_tx_hash(), 90, true, vec![]));

        let first = deposit.wait(None, &PollConfig::default()).await.unwrap();
        let queries = provider.receipt_queries();
        let second = deposit.wait(None, &PollConfig::default()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(provider.receipt_queries(), queries);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out() {
        let provider = TestBridgeProvider::new(42161, 100);
        let poll = PollConfig::default().with_timeout(Duration::from_secs(5));
        let err = deposit(&provider).wait(None, &poll).await.unwrap_err();
        assert!(matches!(err, MessageError::Timeout(_)));
    }

    #[test]
    fn test_short_payload_is_rejected() {
        let provider = TestBridgeProvider::default();
        let network = network_by_chain_id(42161).unwrap();
        assert!(
            EthDepositMessage::from_event_components(provider, network, U256::ZERO, Address::ZERO, &[0u8; 10])
                .is_err()
        );
    }
}
