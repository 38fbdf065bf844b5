//! Storage error types.

use std::path::PathBuf;

use thiserror::Error;

/// Storage error type.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Table not found.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// Table already exists.
    #[error("table already exists: {0}")]
    TableExists(String),

    /// I/O failure on a backing file.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Backing document could not be encoded or decoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Transaction state error.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// Invalid storage configuration.
    #[error("invalid storage configuration: {0}")]
    InvalidConfig(String),
}

/// Storage result type.
pub type StorageResult<T> = Result<T, StorageError>;
