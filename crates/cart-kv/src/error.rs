//! Storage error types.

use thiserror::Error;

/// Errors that can occur when reading or writing storage.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Storage is switched off (private browsing, policy, ...).
    #[error("Storage is disabled")]
    Disabled,

    /// Writing would exceed the store's byte quota.
    #[error("Storage quota exceeded: need {needed} bytes, quota is {quota}")]
    QuotaExceeded { needed: usize, quota: usize },

    /// Failed to serialize or deserialize a value.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Filesystem failure in a file-backed store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other backend failure.
    #[error("Store operation failed: {0}")]
    Backend(String),
}
