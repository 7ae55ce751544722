//! Retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use cascade_config::GatewayConfig;
use cascade_traits::GatewayError;

/// Retry policy for gateway requests.
///
/// Only errors for which [`GatewayError::is_retryable`] holds are retried.
/// Everything else propagates on the first failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each failure.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Reads the policy from gateway configuration.
    pub fn from_config(config: &GatewayConfig) -> Self {
        let base_delay =
            Duration::try_from_secs_f64(config.retry_delay_seconds).unwrap_or(Duration::ZERO);
        Self::new(config.retry_attempts, base_delay)
    }

    /// Delay after the given failed attempt: `base_delay * 2^(attempt - 1)`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exponent)
    }

    /// Runs `f` until it succeeds, fails fatally, or attempts run out.
    pub async fn execute<F, Fut, T>(&self, mut f: F) -> Result<T, GatewayError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match f().await {
                Ok(result) => return Ok(result),
                Err(e) if !e.is_retryable() => {
                    debug!(attempt, error = %e, "Fatal gateway error, not retrying");
                    return Err(e);
                }
                Err(e) if attempt >= max_attempts => {
                    warn!(
                        attempt,
                        max_attempts,
                        error = %e,
                        "All retry attempts exhausted"
                    );
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.delay_for_attempt(attempt);
                    warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Gateway request failed, retrying after delay"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
