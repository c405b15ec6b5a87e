//! Backoff for idempotent RPC lookups (connection check, chain head)

use std::future::Future;
use std::time::Duration;
use anyhow::Result;
use tracing::{debug, warn};
use crate::errors::{PoolError, PoolResult};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::head_lookup()
    }
}

impl RetryPolicy {
    /// Startup connection check against a node that may still be coming up.
    pub fn connection() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }

    /// Chain head resolution before a scan.
    pub fn head_lookup() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
            multiplier: 2.0,
        }
    }

    /// Backoff before retrying after `attempt` failures, capped at `max_delay`
    /// and jittered by up to 10% either way.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let base = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = base.min(self.max_delay.as_secs_f64());
        let jitter = 1.0 + 0.2 * (rand::random::<f64>() - 0.5);
        Duration::from_secs_f64((capped * jitter).max(0.0))
    }
}

/// Runs `operation` until it succeeds or the policy's attempts are spent; the last
/// error is returned as [`PoolError::Network`].
pub async fn retry_with_backoff<F, Fut, T>(
    operation: F,
    policy: &RetryPolicy,
    what: &str,
) -> PoolResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(what, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if attempt >= max_attempts => {
                return Err(PoolError::Network {
                    message: format!("{} failed after {} attempts", what, attempt),
                    source: Some(e),
                    retry_count: attempt,
                });
            }
            Err(e) => {
                let delay = policy.delay_after(attempt);
                warn!(
                    "🔁 {} failed (attempt {}/{}): {:#}. Retrying in {}ms",
                    what,
                    attempt,
                    max_attempts,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
