//! Bounded, cancellable polling.

use crate::MessageError;
use core::{future::Future, time::Duration};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Default delay between two polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Controls how long and how often a wait polls the chain.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between two attempts.
    pub interval: Duration,
    /// Upper bound on the whole wait. Some waits fall back to a network default when unset.
    pub timeout: Option<Duration>,
    /// Cancels the wait.
    pub cancellation: CancellationToken,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
            cancellation: CancellationToken::new(),
        }
    }
}

impl PollConfig {
    /// Sets the delay between attempts.
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Bounds the wait.
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Ties the wait to `token`.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Returns a copy bounded by `timeout` unless a bound is already set.
    pub fn or_timeout(&self, timeout: Duration) -> Self {
        Self { timeout: Some(self.timeout.unwrap_or(timeout)), ..self.clone() }
    }
}

/// Calls `attempt` until it yields a value, the timeout elapses or the wait is cancelled.
///
/// Errors returned by `attempt` end the wait immediately.
pub async fn poll_until<T, F, Fut>(config: &PollConfig, mut attempt: F) -> Result<T, MessageError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, MessageError>>,
{
    let deadline = config.timeout.map(|timeout| (Instant::now() + timeout, timeout));
    loop {
        if config.cancellation.is_cancelled() {
            return Err(MessageError::Cancelled);
        }
        if let Some(value) = attempt().await? {
            return Ok(value);
        }

        let mut delay = config.interval;
        if let Some((deadline, timeout)) = deadline {
            let now = Instant::now();
            if now >= deadline {
                return Err(MessageError::Timeout(timeout));
            }
            delay = delay.min(deadline - now);
        }

        tokio::select! {
            _ = config.cancellation.cancelled() => return Err(MessageError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
