//! # sqlbridge-client
//!
//! Query client for sqlbridge.
//!
//! A [`Glue`] is built over one storage backend and executes SQL text that
//! may hold several `;`-separated statements. It returns one
//! [`QueryResult`] per statement, in order, with values expressed as
//! [`SqlValue`].
//!
//! - **Blocking**: [`Glue::query`] runs the batch on the calling thread.
//! - **Non-blocking**: [`Glue::query_async`] queues the batch on the
//!   client's worker thread and returns a [`QueryHandle`] that can be
//!   awaited or waited on with a bound.
//!
//! ## Quick Start
//!
//! ```rust
//! use sqlbridge_client::{Glue, QueryResult, SqlValue, StorageConfig};
//!
//! let glue = Glue::open(&StorageConfig::Memory).unwrap();
//! let results = glue
//!     .query("CREATE TABLE t (id INTEGER); INSERT INTO t VALUES (1); SELECT id FROM t")
//!     .unwrap();
//!
//! assert_eq!(results[1], QueryResult::Insert { rows: 1 });
//! let (_, rows) = results[2].as_select().unwrap();
//! assert_eq!(rows[0][0], SqlValue::I64(1));
//! ```
//!
//! ## Async
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use sqlbridge_client::{storage, ClientError, Glue};
//!
//! # async fn run() -> Result<(), ClientError> {
//! let glue = Glue::new(storage::memory())?;
//! let mut handle = glue.query_async("SELECT 1");
//! match handle.timeout(Duration::from_secs(1)).await {
//!     Err(ClientError::Timeout(_)) => {
//!         // Still running; wait for the real outcome.
//!         let results = handle.await?;
//!         println!("{} results", results.len());
//!     }
//!     other => println!("{:?}", other?),
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Client configuration.
pub mod config;

/// Engine to client conversions.
pub mod convert;

/// Error types.
pub mod error;

/// The query client.
pub mod glue;

/// Completion handles.
pub mod handle;

/// Query results.
pub mod result;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use glue::{ClientStats, Glue};
pub use handle::{BatchOutcome, QueryHandle};
pub use result::QueryResult;

pub use sqlbridge_sql::{storage, Storage, StorageConfig, StorageError};
pub use sqlbridge_value::SqlValue;
