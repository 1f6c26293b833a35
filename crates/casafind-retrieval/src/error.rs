//! Retrieval error types.

use thiserror::Error;

/// Errors that can occur during retrieval operations.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The caller passed a value rejected before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Underlying persistence cannot be read or written.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] std::io::Error),

    /// Snapshot serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP error while talking to the embedding API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Embedding generation failed.
    #[error("embedding error: {0}")]
    Embedding(String),
}
