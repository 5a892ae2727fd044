//! Retry Module
//!
//! Exponential-backoff wrapper for fallible async operations.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Retry schedule: up to `max_retries` extra attempts, the first after
/// `base_delay`, each following one after double the previous delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }
}

impl Default for RetryPolicy {
    /// Two attempts at most, the second 500ms after the first failure.
    fn default() -> Self {
        Self::new(1, Duration::from_millis(500))
    }
}

/// Runs `op` until it succeeds or the policy is exhausted.
///
/// The last error is returned unchanged. `op` is called again from scratch
/// for each attempt, so it must build a new future every time.
pub async fn retry<T, E, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut retries_left = policy.max_retries;
    let mut delay = policy.base_delay;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if retries_left > 0 => {
                warn!(
                    error = %err,
                    retries_left,
                    delay_ms = delay.as_millis() as u64,
                    "Attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                retries_left -= 1;
                delay = delay.saturating_mul(2);
            }
            Err(err) => return Err(err),
        }
    }
}
