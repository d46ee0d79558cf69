//! Rate-limit retry around provider calls.
//!
//! Only `ProviderError::RateLimited` is retried. Attempt `n` (from zero) that
//! is rate limited waits `base_delay * 2^n` before the next attempt; there is
//! no wait after the last one. Every other error, timeouts included, goes
//! straight back to the caller.

use async_trait::async_trait;
use errors::{InvokeError, ProviderError};
use metrics::counter;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// How a sleeping backoff is performed. Swapped out in tests.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first included.
    pub max_attempts: u32,
    pub base_delay: Duration
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1)
        }
    }
}

impl From<&config::RetryConfig> for RetryPolicy {
    fn from(config: &config::RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms)
        }
    }
}

#[derive(Clone)]
pub struct RetryingInvoker {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>
}

impl RetryingInvoker {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_sleeper(policy, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { policy, sleeper }
    }

    /// Wait after the rate-limited attempt numbered `attempt` (from zero).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.policy
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    pub async fn invoke<T, F, Fut>(
        &self,
        operation_name: &str,
        mut operation: F
    ) -> Result<T, InvokeError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>
    {
        let max_attempts = self.policy.max_attempts.max(1);

        let mut attempt = 0;
        loop {
            let error = match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(
                            operation = operation_name,
                            attempts = attempt + 1,
                            "Provider call succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(error) => error
            };

            if !error.is_rate_limited() {
                tracing::warn!(
                    operation = operation_name,
                    provider = error.provider(),
                    error = %error,
                    "Provider call failed"
                );
                return Err(InvokeError::Provider(error));
            }

            counter!(
                "learnpath_provider_retries_total",
                "provider" => error.provider().to_string(),
                "operation" => operation_name.to_string()
            )
            .increment(1);

            if attempt + 1 >= max_attempts {
                tracing::error!(
                    operation = operation_name,
                    provider = error.provider(),
                    attempts = max_attempts,
                    "Provider still rate limited, giving up"
                );
                return Err(InvokeError::RetriesExhausted {
                    attempts: max_attempts,
                    last: error
                });
            }

            let delay = self.backoff_for(attempt);
            tracing::warn!(
                operation = operation_name,
                provider = error.provider(),
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                "Provider rate limited, backing off"
            );
            self.sleeper.sleep(delay).await;
            attempt += 1;
        }
    }
}
