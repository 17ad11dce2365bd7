//! Global arguments for the CLI.

use anyhow::{Context, Result};
use arb_messages::PollConfig;
use arb_primitives::{ArbitrumNetwork, network_by_chain_id, network_by_name};
use arb_providers_alloy::AlloyBridgeProvider;
use clap::{ArgAction, Parser};
use std::time::Duration;
use url::Url;

/// Global arguments for the CLI.
#[derive(Parser, Clone, Debug)]
pub(crate) struct GlobalArgs {
    /// Verbosity level (0-3).
    #[arg(long, short, global = true, action = ArgAction::Count)]
    pub(crate) v: u8,
    /// The Arbitrum chain: a registry name, a chain id, or the path of a JSON configuration.
    #[arg(long, short = 'n', global = true, default_value = "arb1", env = "ARB_NETWORK")]
    pub(crate) network: String,
    /// URL of the parent chain RPC API.
    #[arg(long, visible_alias = "l1", global = true, env = "L1_RPC")]
    pub(crate) l1_rpc: Option<Url>,
    /// URL of the Arbitrum chain RPC API.
    #[arg(long, visible_alias = "l2", global = true, env = "L2_RPC")]
    pub(crate) l2_rpc: Option<Url>,
    /// Delay between two polls, in milliseconds.
    #[arg(long, global = true, default_value_t = 500, env = "ARB_POLL_INTERVAL")]
    pub(crate) poll_interval: u64,
    /// Upper bound on waits, in seconds.
    #[arg(long, global = true, env = "ARB_WAIT_TIMEOUT")]
    pub(crate) timeout: Option<u64>,
}

impl GlobalArgs {
    /// Resolves the network configuration.
    pub(crate) fn network(&self) -> Result<ArbitrumNetwork> {
        resolve_network(&self.network)
    }

    /// Connects to the parent chain.
    pub(crate) fn l1_provider(&self) -> Result<AlloyBridgeProvider> {
        let url = self.l1_rpc.clone().context("--l1-rpc is required")?;
        Ok(AlloyBridgeProvider::new_http(url))
    }

    /// Connects to the Arbitrum chain.
    pub(crate) fn l2_provider(&self) -> Result<AlloyBridgeProvider> {
        let url = self.l2_rpc.clone().context("--l2-rpc is required")?;
        Ok(AlloyBridgeProvider::new_http(url))
    }

    /// The polling configuration of waits.
    pub(crate) fn poll_config(&self) -> PollConfig {
        let config = PollConfig::default().with_interval(Duration::from_millis(self.poll_interval));
        match self.timeout {
            Some(secs) => config.with_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }
}

/// Resolves a network from a registry name, a chain id, or the path of a JSON configuration.
pub(crate) fn resolve_network(value: &str) -> Result<ArbitrumNetwork> {
    if let Ok(network) = network_by_name(value) {
        return Ok(network.clone());
    }
    if let Ok(chain_id) = value.parse::<u64>() {
        return Ok(network_by_chain_id(chain_id)?.clone());
    }
    let json = std::fs::read_to_string(value)
        .with_context(|| format!("{value} is neither a known network nor a readable file"))?;
    ArbitrumNetwork::from_json(&json).with_context(|| format!("invalid network file {value}"))
}
