use thiserror::Error;

/// Storage-specific error types for the roster persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document is not valid JSON or does not match the roster schema
    #[error("Malformed roster document: {0}")]
    Json(#[from] serde_json::Error),

    /// Document parsed but violates a roster invariant
    #[error("Roster schema violation: {0}")]
    Schema(String),

    /// Backend refused the operation
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for modulock_core::Error {
    fn from(error: StorageError) -> Self {
        modulock_core::Error::Persistence(error.to_string())
    }
}
