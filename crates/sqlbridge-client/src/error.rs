//! Error types for the query client.

use std::time::Duration;

use sqlbridge_sql::{SqlError, StorageError};
use sqlbridge_value::ValueError;
use thiserror::Error;

use crate::result::QueryResult;

/// Client error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A result value violated its variant contract.
    #[error(transparent)]
    InvalidValue(#[from] ValueError),

    /// A statement failed. Statements before it stay applied and their
    /// results are kept in `completed`; statements after it were not run.
    #[error("statement {index} failed: {source}")]
    Execution {
        /// Zero-based index of the failing statement.
        index: usize,
        /// Engine error.
        source: SqlError,
        /// Results of the statements that ran before the failure.
        completed: Vec<QueryResult>,
    },

    /// A statement ran but its result could not be converted. Earlier
    /// results are kept in `completed` as for [`ClientError::Execution`].
    #[error("statement {index} returned an invalid result: {source}")]
    Conversion {
        /// Zero-based index of the statement.
        index: usize,
        /// Conversion error.
        source: ValueError,
        /// Results of the statements that ran before it.
        completed: Vec<QueryResult>,
    },

    /// The batch panicked on the worker. The worker keeps serving later
    /// batches.
    #[error("batch panicked: {0}")]
    BatchPanicked(String),

    /// A bounded wait elapsed before the batch finished.
    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    /// The storage backend could not be opened.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The worker went away before completing the batch.
    #[error("query worker stopped")]
    WorkerStopped,

    /// The worker thread could not be started.
    #[error("failed to spawn query worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// The result was already taken from this handle.
    #[error("query result already taken")]
    ResultTaken,

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Returns true for [`ClientError::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout(_))
    }

    /// Returns the failing statement index for execution and conversion
    /// errors.
    pub fn statement_index(&self) -> Option<usize> {
        match self {
            ClientError::Execution { index, .. } | ClientError::Conversion { index, .. } => {
                Some(*index)
            }
            _ => None,
        }
    }

    /// Returns the results completed before an execution error.
    pub fn completed(&self) -> &[QueryResult] {
        match self {
            ClientError::Execution { completed, .. }
            | ClientError::Conversion { completed, .. } => completed,
            _ => &[],
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
