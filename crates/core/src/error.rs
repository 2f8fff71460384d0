//! Error types for the LexSkill domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Text-shape failures in model output are *not* errors: skills absorb them
//! into a degraded [`crate::SkillResult`]. Everything here propagates.

use thiserror::Error;

/// The top-level error type for all LexSkill operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Registry errors ---
    #[error("Unknown skill: {0}")]
    UnknownSkill(String),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Document workflow ---
    #[error("Document generation failed: {0}")]
    Document(String),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures at the model-provider boundary.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Response contained no text segment")]
    EmptyResponse,
}

impl ProviderError {
    /// Whether re-sending the same request may succeed.
    ///
    /// Rate limits, timeouts, network failures and server-side errors
    /// (5xx, 529 overloaded) are transient. Bad requests, auth failures
    /// and unknown models are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Network(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::AuthenticationFailed(_)
            | Self::ModelNotFound(_)
            | Self::NotConfigured(_)
            | Self::EmptyResponse => false,
        }
    }

    /// Server-provided hint for how long to wait before retrying.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }
}
