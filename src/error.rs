// Error types for modcache.
// Handles GitHub API errors, manifest failures, cache I/O, and configuration errors.

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum ModCacheError {
    #[error("HTTP request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(String),
}

impl ModCacheError {
    /// Whether this failure means the GitHub quota is exhausted.
    ///
    /// Prefers the structured `RateLimited` classification produced by the
    /// client from response headers; falls back to inspecting the message of
    /// authorization-class responses that carried no usable headers.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ModCacheError::RateLimited { .. } => true,
            ModCacheError::Http { status, message } => {
                matches!(status, 403 | 429) && mentions_rate_limit(message)
            }
            ModCacheError::Other(message) => mentions_rate_limit(message),
            _ => false,
        }
    }
}

/// Check a GitHub error message for quota-exhaustion wording.
pub(crate) fn mentions_rate_limit(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("rate limit") || lower.contains("ratelimit")
}

pub type Result<T> = std::result::Result<T, ModCacheError>;
