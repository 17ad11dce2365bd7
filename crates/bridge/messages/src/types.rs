//! Chain data exchanged with the providers.

use alloy_primitives::{Address, B256, U256};
use alloy_rpc_types_eth::{Log, TransactionRequest};
use serde::{Deserialize, Serialize};

/// A block header as returned by an Arbitrum aware node.
///
/// Arbitrum chains extend the header with the send root and send count of the outbox tree, and
/// the number of the parent chain block the L2 block was produced at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbBlock {
    /// The block number.
    #[serde(with = "alloy_serde::quantity")]
    pub number: u64,
    /// The block hash.
    pub hash: B256,
    /// The block timestamp, in seconds.
    #[serde(with = "alloy_serde::quantity")]
    pub timestamp: u64,
    /// The root of the outbox tree after this block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_root: Option<B256>,
    /// The number of leaves in the outbox tree after this block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_count: Option<U256>,
    /// The parent chain block number this block was produced at.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "alloy_serde::quantity::opt")]
    pub l1_block_number: Option<u64>,
    /// The base fee of the block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_fee_per_gas: Option<U256>,
}

impl ArbBlock {
    /// The send count, zero if the block carries none.
    pub fn send_count_or_zero(&self) -> U256 {
        self.send_count.unwrap_or_default()
    }
}

/// A transaction receipt, reduced to the fields the message readers consume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    /// The transaction hash.
    pub transaction_hash: B256,
    /// Hash of the block the transaction was included in.
    pub block_hash: B256,
    /// Number of the block the transaction was included in.
    #[serde(with = "alloy_serde::quantity")]
    pub block_number: u64,
    /// Whether the transaction succeeded.
    pub status: bool,
    /// The sender.
    pub from: Address,
    /// The recipient, `None` for contract creations.
    pub to: Option<Address>,
    /// The emitted logs.
    pub logs: Vec<Log>,
}

/// Overrides applied to transactions sent by the message writers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxOverrides {
    /// The sender. Defaults to the signer's address.
    pub from: Option<Address>,
    /// The gas limit. Zero lets the node estimate it.
    pub gas_limit: Option<u64>,
    /// The value sent along.
    pub value: Option<U256>,
    /// The nonce.
    pub nonce: Option<u64>,
    /// The max fee per gas.
    pub max_fee_per_gas: Option<u128>,
    /// The max priority fee per gas.
    pub max_priority_fee_per_gas: Option<u128>,
}

impl TxOverrides {
    /// Applies the overrides to `tx`, defaulting the sender to `signer`.
    pub fn apply(&self, mut tx: TransactionRequest, signer: Address) -> TransactionRequest {
        tx.from = Some(self.from.unwrap_or(signer));
        match self.gas_limit {
            Some(0) => tx.gas = None,
            Some(gas) => tx.gas = Some(gas),
            None => {}
        }
        if let Some(value) = self.value {
            tx.value = Some(value);
        }
        if let Some(nonce) = self.nonce {
            tx.nonce = Some(nonce);
        }
        if let Some(fee) = self.max_fee_per_gas {
            tx.max_fee_per_gas = Some(fee);
        }
        if let Some(fee) = self.max_priority_fee_per_gas {
            tx.max_priority_fee_per_gas = Some(fee);
        }
        tx
    }
}
