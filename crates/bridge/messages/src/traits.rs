//! Capabilities the message readers and writers need from a chain.

use crate::{ArbBlock, ProviderError, TxReceipt};
use alloy_eips::BlockId;
use alloy_primitives::{Address, B256, Bytes};
use alloy_rpc_types_eth::{Filter, Log, TransactionRequest};
use async_trait::async_trait;
use core::fmt::Debug;

/// Read access to a chain.
#[async_trait]
pub trait BridgeProvider: Debug + Send + Sync {
    /// Returns the chain id.
    async fn chain_id(&self) -> Result<u64, ProviderError>;

    /// Returns the number of the latest block.
    async fn block_number(&self) -> Result<u64, ProviderError>;

    /// Returns a block header, including the Arbitrum specific fields when present.
    async fn block(&self, id: BlockId) -> Result<Option<ArbBlock>, ProviderError>;

    /// Returns the receipt of a transaction, if it was included.
    async fn transaction_receipt(&self, hash: B256) -> Result<Option<TxReceipt>, ProviderError>;

    /// Returns the logs matching `filter`.
    async fn logs(&self, filter: &Filter) -> Result<Vec<Log>, ProviderError>;

    /// Executes a call against the latest state.
    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, ProviderError>;

    /// Estimates the gas used by `tx`.
    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64, ProviderError>;

    /// Returns the current gas price.
    async fn gas_price(&self) -> Result<u128, ProviderError>;
}

/// Write access to a chain.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BridgeSigner: Debug + Send + Sync {
    /// The address transactions are sent from.
    fn address(&self) -> Address;

    /// Signs and sends `tx`, then waits for its receipt.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxReceipt, ProviderError>;
}
