//! Error types for the IntelX client.

use thiserror::Error;

/// Errors that can occur while talking to the leak index.
#[derive(Error, Debug)]
pub enum IntelxError {
    /// Invalid API key
    #[error("authentication failed: {message}")]
    AuthenticationFailed {
        /// Error message
        message: String,
    },

    /// Account has no credits left for this operation
    #[error("payment required: {message}")]
    PaymentRequired {
        /// Error message
        message: String,
    },

    /// Search id or document no longer exists upstream
    #[error("not found: {what}")]
    NotFound {
        /// What was requested
        what: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded: {message}")]
    RateLimited {
        /// Error message
        message: String,
    },

    /// Search was refused when it was submitted
    #[error("search rejected for '{term}': {reason}")]
    SearchRejected {
        /// Search term
        term: String,
        /// Reason reported by the index
        reason: String,
    },

    /// API error with status code
    #[error("API error: status {status}, {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntelxError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Network(_) => true,
            Self::ApiError { status, .. } => *status >= 500 || *status == 408,
            Self::AuthenticationFailed { .. }
            | Self::PaymentRequired { .. }
            | Self::NotFound { .. }
            | Self::SearchRejected { .. }
            | Self::Serialization(_)
            | Self::Internal(_) => false,
        }
    }
}

/// Result type alias for IntelX operations.
pub type Result<T> = std::result::Result<T, IntelxError>;
