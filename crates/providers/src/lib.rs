//! Model provider implementations for LexSkill.
//!
//! All providers implement the `lexskill_core::Provider` trait.
//! [`build_from_config`] assembles the Anthropic client behind the retry wrapper.

pub mod anthropic;
pub mod retry;

pub use anthropic::AnthropicProvider;
pub use retry::{RetryPolicy, RetryingProvider};

use lexskill_config::AppConfig;
use lexskill_core::Provider;
use lexskill_core::error::ProviderError;
use std::sync::Arc;
use std::time::Duration;

/// Build the provider stack from configuration.
///
/// Fails with `NotConfigured` when no API key is available.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        ProviderError::NotConfigured(
            "No API key. Set LEXSKILL_API_KEY or ANTHROPIC_API_KEY, or run `lexskill onboard`".into(),
        )
    })?;

    let mut anthropic = AnthropicProvider::new(api_key)
        .with_timeout(Duration::from_secs(config.request_timeout_secs));
    if let Some(url) = &config.base_url {
        anthropic = anthropic.with_base_url(url.clone());
    }

    let policy = RetryPolicy::from_config(&config.retry);
    if policy.max_retries == 0 {
        return Ok(Arc::new(anthropic));
    }
    Ok(Arc::new(RetryingProvider::new(Arc::new(anthropic), policy)))
}
