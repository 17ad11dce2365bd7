//! Arbitrum network configuration.

use crate::{DEFAULT_DEPOSIT_TIMEOUT, DEFAULT_RETRYABLE_LIFETIME_SECONDS};
use alloy_primitives::{Address, U256, address};
use core::time::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised while resolving a network configuration.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// No network is registered under the given chain id.
    #[error("unrecognized network: chain id {0}")]
    UnknownChainId(u64),
    /// No network is registered under the given name.
    #[error("unrecognized network: {0}")]
    UnknownName(String),
    /// The network configuration could not be parsed.
    #[error("invalid network configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Addresses of the core bridge contracts deployed on the parent chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthBridge {
    /// The bridge, emitting `MessageDelivered`.
    pub bridge: Address,
    /// The delayed inbox, emitting `InboxMessageDelivered`.
    pub inbox: Address,
    /// The nitro outbox.
    pub outbox: Address,
    /// The rollup contract.
    pub rollup: Address,
    /// The sequencer inbox.
    pub sequencer_inbox: Address,
    /// Classic outboxes, keyed by address, valued by the first batch they serve.
    #[serde(default)]
    pub classic_outboxes: BTreeMap<Address, u64>,
}

/// The configuration of an Arbitrum chain and its bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbitrumNetwork {
    /// The chain id of the Arbitrum chain.
    pub chain_id: u64,
    /// Human readable name of the chain.
    pub name: String,
    /// The chain id of the parent chain the bridge is deployed on.
    pub parent_chain_id: u64,
    /// Number of parent chain blocks a rollup node has to wait before it can be confirmed.
    pub confirm_period_blocks: u64,
    /// How long a retryable ticket lives before it expires.
    #[serde(default = "default_retryable_lifetime")]
    pub retryable_lifetime_seconds: u64,
    /// The first L2 block produced by nitro.
    #[serde(default)]
    pub nitro_genesis_block: u64,
    /// The first parent chain block at which the bridge ran nitro.
    #[serde(default)]
    pub nitro_genesis_l1_block: u64,
    /// Default bound on waits for L1 -> L2 messages.
    #[serde(default = "default_deposit_timeout", with = "duration_millis")]
    pub deposit_timeout: Duration,
    /// Bridge contracts on the parent chain.
    pub eth_bridge: EthBridge,
    /// The ERC-20 used to pay fees, if the chain does not use ETH.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_token: Option<Address>,
}

const fn default_retryable_lifetime() -> u64 {
    DEFAULT_RETRYABLE_LIFETIME_SECONDS
}

const fn default_deposit_timeout() -> Duration {
    DEFAULT_DEPOSIT_TIMEOUT
}

impl ArbitrumNetwork {
    /// Parses a network configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, NetworkError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns `true` if a parent chain block predates the nitro migration of this network.
    ///
    /// Receipts and messages are classified once, from the block of the receipt they come
    /// from, and keep their era for their whole lifetime.
    pub const fn is_classic(&self, l1_block_number: u64) -> bool {
        l1_block_number < self.nitro_genesis_l1_block
    }

    /// Returns `true` if an L2 block was produced by the classic stack.
    pub const fn is_classic_l2_block(&self, l2_block_number: u64) -> bool {
        l2_block_number < self.nitro_genesis_block
    }

    /// Returns the classic outbox responsible for `batch_number`.
    ///
    /// The outbox with the greatest activation batch not exceeding `batch_number` is chosen.
    /// Returns `None` if the chain has no classic outbox activated at that batch.
    pub fn classic_outbox_for_batch(&self, batch_number: U256) -> Option<Address> {
        self.eth_bridge
            .classic_outboxes
            .iter()
            .filter(|(_, activation)| U256::from(**activation) <= batch_number)
            .max_by_key(|(_, activation)| **activation)
            .map(|(outbox, _)| *outbox)
    }

    /// Returns `true` if the chain pays fees in a custom ERC-20.
    pub fn is_custom_fee_token(&self) -> bool {
        self.native_token.is_some_and(|token| !token.is_zero())
    }
}

lazy_static::lazy_static! {
    /// Networks known out of the box.
    pub static ref NETWORKS: Vec<ArbitrumNetwork> = vec![arbitrum_one(), arbitrum_nova(), arbitrum_sepolia()];
}

/// Returns a registered network by chain id.
pub fn network_by_chain_id(chain_id: u64) -> Result<&'static ArbitrumNetwork, NetworkError> {
    NETWORKS.iter().find(|n| n.chain_id == chain_id).ok_or(NetworkError::UnknownChainId(chain_id))
}

/// Returns a registered network by name. Matching ignores case.
pub fn network_by_name(name: &str) -> Result<&'static ArbitrumNetwork, NetworkError> {
    NETWORKS
        .iter()
        .find(|n| n.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| NetworkError::UnknownName(name.to_string()))
}

fn arbitrum_one() -> ArbitrumNetwork {
    ArbitrumNetwork {
        chain_id: 42161,
        name: "arb1".to_string(),
        parent_chain_id: 1,
        confirm_period_blocks: 45818,
        retryable_lifetime_seconds: DEFAULT_RETRYABLE_LIFETIME_SECONDS,
        nitro_genesis_block: 22207817,
        nitro_genesis_l1_block: 15447158,
        deposit_timeout: DEFAULT_DEPOSIT_TIMEOUT,
        eth_bridge: EthBridge {
            bridge: address!("0x8315177aB297bA92A06054cE80a67Ed4DBd7ed3a"),
            inbox: address!("0x4Dbd4fc535Ac27206064B68FfCf827b0A60BAB3f"),
            outbox: address!("0x0B9857ae2D4A3DBe74ffE1d7DF045bb7F96E4840"),
            rollup: address!("0x5eF0D09d1E6204141B4d37530808eD19f60FBa35"),
            sequencer_inbox: address!("0x1c479675ad559DC151F6Ec7ed3FbF8ceE79582B6"),
            classic_outboxes: BTreeMap::from([
                (address!("0x667e23ABd27E623c11d4CC00ca3EC4d0bD63337a"), 0),
                (address!("0x760723CD2e632826c38Fef8CD438A4CC7E7E1A40"), 30),
            ]),
        },
        native_token: None,
    }
}

fn arbitrum_nova() -> ArbitrumNetwork {
    ArbitrumNetwork {
        chain_id: 42170,
        name: "nova".to_string(),
        parent_chain_id: 1,
        confirm_period_blocks: 45818,
        retryable_lifetime_seconds: DEFAULT_RETRYABLE_LIFETIME_SECONDS,
        nitro_genesis_block: 0,
        nitro_genesis_l1_block: 0,
        deposit_timeout: DEFAULT_DEPOSIT_TIMEOUT,
        eth_bridge: EthBridge {
            bridge: address!("0xC1Ebd02f738644983b6C4B2d440b8e77DdE276Bd"),
            inbox: address!("0xc4448b71118c9071Bcb9734A0EAc55D18A153949"),
            outbox: address!("0xD4B80C3D7240325D18E645B49e6535A3Bf95cc58"),
            rollup: address!("0xFb209827c58283535b744575e11953DCC4bEAD88"),
            sequencer_inbox: address!("0x211E1c4c7f1bF5351Ac850Ed10FD68CFfCF6c21b"),
            classic_outboxes: BTreeMap::new(),
        },
        native_token: None,
    }
}

fn arbitrum_sepolia() -> ArbitrumNetwork {
    ArbitrumNetwork {
        chain_id: 421614,
        name: "sepolia".to_string(),
        parent_chain_id: 11155111,
        confirm_period_blocks: 20,
        retryable_lifetime_seconds: DEFAULT_RETRYABLE_LIFETIME_SECONDS,
        nitro_genesis_block: 0,
        nitro_genesis_l1_block: 0,
        deposit_timeout: DEFAULT_DEPOSIT_TIMEOUT,
        eth_bridge: EthBridge {
            bridge: address!("0x38f918D0E9F1b721EDaA41302E399fa1B79333a9"),
            inbox: address!("0xaAe29B0366299461418F5324a79Afc425BE5ae21"),
            outbox: address!("0x65f07C7D521164a4d5DaC6eB8Fac8DA067A3B78F"),
            rollup: address!("0xd80810638dbDF9081b72C1B33c65375e807281C8"),
            sequencer_inbox: address!("0x6c97864CE4bEf387dE0b3310A44230f7E3F1be0D"),
            classic_outboxes: BTreeMap::new(),
        },
        native_token: None,
    }
}

mod duration_millis {
    use core::time::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(15447157, true)]
    #[case(15447158, false)]
    #[case(20000000, false)]
    fn test_is_classic(#[case] block: u64, #[case] classic: bool) {
        assert_eq!(network_by_chain_id(42161).unwrap().is_classic(block), classic);
    }

    #[test]
    fn test_nitro_only_network_is_never_classic() {
        assert!(!network_by_name("nova").unwrap().is_classic(0));
    }

    #[rstest]
    #[case(0, address!("0x667e23ABd27E623c11d4CC00ca3EC4d0bD63337a"))]
    #[case(29, address!("0x667e23ABd27E623c11d4CC00ca3EC4d0bD63337a"))]
    #[case(30, address!("0x760723CD2e632826c38Fef8CD438A4CC7E7E1A40"))]
    #[case(1000, address!("0x760723CD2e632826c38Fef8CD438A4CC7E7E1A40"))]
    fn test_classic_outbox_for_batch(#[case] batch: u64, #[case] expected: Address) {
        let network = network_by_chain_id(42161).unwrap();
        assert_eq!(network.classic_outbox_for_batch(U256::from(batch)), Some(expected));
    }

    #[test]
    fn test_classic_outbox_missing() {
        let network = network_by_name("sepolia").unwrap();
        assert_eq!(network.classic_outbox_for_batch(U256::from(5u64)), None);
    }

    #[test]
    fn test_unknown_network() {
        assert!(matches!(network_by_chain_id(1), Err(NetworkError::UnknownChainId(1))));
        assert!(matches!(network_by_name("optimism"), Err(NetworkError::UnknownName(_))));
    }

    #[test]
    fn test_network_from_json() {
        let json = r#"{
            "chainId": 412346,
            "name": "local",
            "parentChainId": 1337,
            "confirmPeriodBlocks": 20,
            "depositTimeout": 900000,
            "ethBridge": {
                "bridge": "0x2b360a9881f21c3d7aa0ea6ca0de2a3341d4ef3c",
                "inbox": "0xff4a24b22f94979e9ba5f3eb35838aa814bad6f1",
                "outbox": "0x49940929c7cA9b50Ff57a01d3a92817A414E6B9B",
                "rollup": "0x65a59d67da8e710ef9a01eca37f83f84aedec416",
                "sequencerInbox": "0xe7362d0787b51d8c72d504803e5b1d6dcda89540"
            }
        }"#;
        let network = ArbitrumNetwork::from_json(json).unwrap();
        assert_eq!(network.chain_id, 412346);
        assert_eq!(network.deposit_timeout, Duration::from_secs(900));
        assert_eq!(network.retryable_lifetime_seconds, DEFAULT_RETRYABLE_LIFETIME_SECONDS);
        assert!(network.eth_bridge.classic_outboxes.is_empty());
        assert!(!network.is_custom_fee_token());

        let round_trip = ArbitrumNetwork::from_json(&serde_json::to_string(&network).unwrap()).unwrap();
        assert_eq!(round_trip, network);
    }
}
