//! Retrying provider: exponential backoff with jitter for transient failures.
//!
//! Wraps any provider. Rate limits, timeouts, network failures and 5xx
//! responses are retried up to `max_retries` times; everything else is
//! returned on first sight.

use async_trait::async_trait;
use lexskill_core::error::ProviderError;
use lexskill_core::provider::*;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Backoff schedule for transient provider failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Add up to half the computed delay as random jitter
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30_000),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Never retry.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn from_config(config: &lexskill_config::RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            jitter: true,
        }
    }

    /// Delay before retry number `attempt` (0-based).
    ///
    /// A provider-supplied `retry-after` wins over the computed backoff and
    /// is capped at `max_delay`. Computed backoff is capped first, then up to
    /// half of it again is added as jitter.
    pub fn delay_for(&self, attempt: u32, err: &ProviderError) -> Duration {
        if let Some(secs) = err.retry_after_secs() {
            return Duration::from_secs(secs).min(self.max_delay);
        }

        let base_ms = self.base_delay.as_millis() as u64;
        let backoff_ms = base_ms.saturating_mul(2u64.saturating_pow(attempt));
        let capped_ms = backoff_ms.min(self.max_delay.as_millis() as u64);

        let jitter_ms = if self.jitter && capped_ms > 1 {
            rand::rng().random_range(0..=capped_ms / 2)
        } else {
            0
        };

        Duration::from_millis(capped_ms.saturating_add(jitter_ms))
    }
}

/// A provider that re-sends transient failures to the inner provider.
pub struct RetryingProvider {
    name: String,
    inner: Arc<dyn lexskill_core::Provider>,
    policy: RetryPolicy,
}

impl RetryingProvider {
    pub fn new(inner: Arc<dyn lexskill_core::Provider>, policy: RetryPolicy) -> Self {
        Self {
            name: format!("{}+retry", inner.name()),
            inner,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl lexskill_core::Provider for RetryingProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let mut attempt = 0;
        loop {
            match self.inner.complete(request.clone()).await {
                Ok(response) => {
                    if attempt > 0 {
                        info!(
                            provider = %self.inner.name(),
                            attempts = attempt + 1,
                            "Request succeeded after retry"
                        );
                    }
                    return Ok(response);
                }
                Err(e) if e.is_transient() && attempt < self.policy.max_retries => {
                    let delay = self.policy.delay_for(attempt, &e);
                    warn!(
                        provider = %self.inner.name(),
                        attempt = attempt + 1,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying after transient error"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
