//! [`BridgeProvider`] over an alloy [`RootProvider`].

use crate::map_rpc_error;
use alloy_eips::{BlockId, BlockNumberOrTag};
use alloy_primitives::{B256, Bytes};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_types_eth::{Filter, Log, TransactionReceipt, TransactionRequest};
use arb_messages::{ArbBlock, BridgeProvider, ProviderError, TxReceipt};
use async_trait::async_trait;
use url::Url;

/// A [`BridgeProvider`] backed by an alloy [`RootProvider`].
///
/// Blocks are requested raw so that the Arbitrum header fields (`sendRoot`, `sendCount`,
/// `l1BlockNumber`) survive decoding.
#[derive(Debug, Clone)]
pub struct AlloyBridgeProvider {
    inner: RootProvider,
}

impl AlloyBridgeProvider {
    /// Wraps an existing provider.
    pub const fn new(inner: RootProvider) -> Self {
        Self { inner }
    }

    /// Connects to an HTTP endpoint.
    pub fn new_http(url: Url) -> Self {
        Self::new(RootProvider::new_http(url))
    }

    /// The underlying provider.
    pub const fn inner(&self) -> &RootProvider {
        &self.inner
    }
}

/// Reduces an RPC receipt to the fields the message readers consume.
pub(crate) fn into_receipt(receipt: TransactionReceipt) -> TxReceipt {
    TxReceipt {
        transaction_hash: receipt.transaction_hash,
        block_hash: receipt.block_hash.unwrap_or_default(),
        block_number: receipt.block_number.unwrap_or_default(),
        status: receipt.inner.status(),
        from: receipt.from,
        to: receipt.to,
        logs: receipt.inner.logs().to_vec(),
    }
}

#[async_trait]
impl BridgeProvider for AlloyBridgeProvider {
    async fn chain_id(&self) -> Result<u64, ProviderError> {
        self.inner.get_chain_id().await.map_err(map_rpc_error)
    }

    async fn block_number(&self) -> Result<u64, ProviderError> {
        self.inner.get_block_number().await.map_err(map_rpc_error)
    }

    async fn block(&self, id: BlockId) -> Result<Option<ArbBlock>, ProviderError> {
        let block = match id {
            BlockId::Number(number) => {
                self.inner
                    .raw_request::<(BlockNumberOrTag, bool), Option<ArbBlock>>(
                        "eth_getBlockByNumber".into(),
                        (number, false),
                    )
                    .await
            }
            BlockId::Hash(hash) => {
                self.inner
                    .raw_request::<(B256, bool), Option<ArbBlock>>(
                        "eth_getBlockByHash".into(),
                        (hash.block_hash, false),
                    )
                    .await
            }
        };
        block.map_err(map_rpc_error)
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<TxReceipt>, ProviderError> {
        let receipt = self.inner.get_transaction_receipt(hash).await.map_err(map_rpc_error)?;
        Ok(receipt.map(into_receipt))
    }

    async fn logs(&self, filter: &Filter) -> Result<Vec<Log>, ProviderError> {
        self.inner.get_logs(filter).await.map_err(map_rpc_error)
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, ProviderError> {
        self.inner.call(tx).await.map_err(map_rpc_error)
    }

    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64, ProviderError> {
        self.inner.estimate_gas(tx).await.map_err(map_rpc_error)
    }

    async fn gas_price(&self) -> Result<u128, ProviderError> {
        self.inner.get_gas_price().await.map_err(map_rpc_error)
    }
}
