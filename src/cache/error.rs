use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
/// Errors returned by the on-disk cache store.
pub enum CacheError {
    /// IO error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Category names become directory names and must be a single plain segment.
    #[error("invalid cache category '{category}'")]
    InvalidCategory {
        /// Offending category.
        category: String,
    },

    /// Background write task panicked or was cancelled.
    #[error("cache write task failed: {0}")]
    WriteTask(#[from] tokio::task::JoinError),

    /// Cache root path is missing/unavailable.
    #[error("cache path unavailable: {path}")]
    StorageUnavailable {
        /// Path that was unavailable.
        path: PathBuf,
    },
}

/// Convenience result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
