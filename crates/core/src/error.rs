//! Error types for the Dictamen domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! Model-output parse failures are deliberately absent: an undecodable
//! Analyst answer becomes [`crate::report::Dictamen::Undecodable`] and an
//! undecodable Critic answer becomes a synthetic rejecting verdict.

use thiserror::Error;

/// The top-level error type for all Dictamen operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Retrieval errors ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Configuration errors (missing template, missing credential) ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Data errors (no matching document, empty text) ---
    #[error("Data error: {message}")]
    Data { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Shorthand for a data error.
    pub fn data(message: impl Into<String>) -> Self {
        Self::Data {
            message: message.into(),
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

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
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("Failed to load index at {path}: {reason}")]
    IndexLoad { path: String, reason: String },

    #[error("Dimension mismatch: index has {expected}, query has {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Incompatible embedding convention: {0}")]
    IncompatibleEmbedding(String),

    #[error("Index position {position} out of range for mapping of {size} records")]
    OutOfRange { position: usize, size: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn retrieval_range_error_names_position() {
        let err = Error::Retrieval(RetrievalError::OutOfRange {
            position: 12,
            size: 10,
        });
        assert!(err.to_string().contains("12"));
        assert!(err.to_string().contains("10 records"));
    }

    #[test]
    fn config_and_data_shorthands() {
        assert!(matches!(Error::config("missing template"), Error::Config { .. }));
        assert!(Error::data("empty text").to_string().contains("empty text"));
    }
}
