//! Error types for Heartline core operations.
//!
//! Every variant here is recoverable from the caller's point of view: the
//! synchronizer maps `NotFound`, `Conflict`, `Unreachable` and `Parse` onto
//! empty-state, retry or local-only behavior. The CLI layer maps whatever
//! surfaces to user-friendly messages.

use thiserror::Error;

/// Result type alias for Heartline operations.
pub type Result<T> = std::result::Result<T, HeartlineError>;

/// Core error type for Heartline operations.
#[derive(Debug, Error)]
pub enum HeartlineError {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Version token no longer matches the remote document
    #[error("Version conflict: {0}")]
    Conflict(String),

    /// Network failure, timeout, or service/authorization error
    #[error("Remote unreachable: {0}")]
    Unreachable(String),

    /// Corrupt persisted or remote data
    #[error("Parse error: {0}")]
    Parse(String),

    /// Local storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A submission is already in flight
    #[error("Busy: {0}")]
    Busy(String),

    /// Generic error (fallback)
    #[error("{0}")]
    Other(String),
}

impl HeartlineError {
    /// Whether repeating the read-modify-write cycle can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, HeartlineError::Conflict(_))
    }
}

impl From<std::io::Error> for HeartlineError {
    fn from(err: std::io::Error) -> Self {
        HeartlineError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for HeartlineError {
    fn from(err: serde_json::Error) -> Self {
        HeartlineError::Parse(err.to_string())
    }
}
