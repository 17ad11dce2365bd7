//! Protocol constants shared by the message resolvers.

use core::time::Duration;

/// Blocks added on top of a rollup node's deadline before it is expected to be confirmed.
pub const ASSERTION_CONFIRMED_PADDING: u64 = 20;

/// Blocks expected to elapse before a new rollup node covering a message is created.
pub const ASSERTION_CREATED_PADDING: u64 = 50;

/// Lifetime of a retryable ticket on every known Arbitrum chain (7 days).
pub const DEFAULT_RETRYABLE_LIFETIME_SECONDS: u64 = 7 * SECONDS_PER_DAY;

/// How long to wait for an L1 -> L2 message to show up on L2 when no timeout is given.
pub const DEFAULT_DEPOSIT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Seconds in a day. The redeem scan sizes its block windows to roughly cover this span.
pub const SECONDS_PER_DAY: u64 = 86_400;
