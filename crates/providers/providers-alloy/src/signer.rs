//! [`BridgeSigner`] over an alloy wallet provider.

use crate::{map_rpc_error, provider::into_receipt};
use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use arb_messages::{BridgeSigner, ProviderError, TxReceipt};
use async_trait::async_trait;
use url::Url;

/// Signs transactions with a local key and sends them through an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct AlloySigner {
    provider: DynProvider,
    address: Address,
}

impl AlloySigner {
    /// Creates a signer sending through `url`, filling nonce, gas and fees on the node.
    pub fn new_http(url: Url, signer: PrivateKeySigner) -> Self {
        let address = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();
        Self { provider, address }
    }
}

#[async_trait]
impl BridgeSigner for AlloySigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxReceipt, ProviderError> {
        let pending = self.provider.send_transaction(tx).await.map_err(map_rpc_error)?;
        let hash = *pending.tx_hash();
        tracing::debug!(target: "alloy_provider", tx = %hash, "sent transaction");
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|err| ProviderError::Transport(format!("transaction {hash}: {err}")))?;
        Ok(into_receipt(receipt))
    }
}
