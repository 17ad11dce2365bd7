//! Fixed addresses of the Arbitrum precompiles.

use alloy_primitives::{Address, address};

/// `ArbSys`, used to send messages to the parent chain.
pub const ARB_SYS: Address = address!("0x0000000000000000000000000000000000000064");

/// `ArbRetryableTx`, managing retryable tickets.
pub const ARB_RETRYABLE_TX: Address = address!("0x000000000000000000000000000000000000006E");

/// The virtual `NodeInterface` contract. Only reachable through `eth_call` and `eth_estimateGas`.
pub const NODE_INTERFACE: Address = address!("0x00000000000000000000000000000000000000C8");
