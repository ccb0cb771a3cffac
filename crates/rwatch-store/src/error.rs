//! Storage error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to initialize store at {path}: {source}")]
    Init {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to persist image {path}: {source}")]
    ImageWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read store file {path}: {source}")]
    StoreRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to persist store file {path}: {source}")]
    StoreWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Store file is corrupted: {0}")]
    Corrupted(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
