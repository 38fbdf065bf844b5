//! # sqlbridge-sql
//!
//! Statement parsing, pluggable storage and a compact executor for the
//! sqlbridge query client.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ SQL text                                                     │
//! └───────────────┬──────────────────────────────────────────────┘
//!                 │ split_statements / parse_statement (sqlparser)
//!                 ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │ ast::Statement          (narrow executable tree)             │
//! └───────────────┬──────────────────────────────────────────────┘
//!                 │ Engine::execute_statement
//!                 ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Storage trait           (memory / json file / shared memory) │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use sqlbridge_sql::{storage, Engine, Payload, Value};
//!
//! let mut engine = Engine::new(storage::memory());
//! engine.execute("CREATE TABLE t (n INTEGER); INSERT INTO t VALUES (7)").unwrap();
//!
//! let rows = match engine.execute_one("SELECT n FROM t").unwrap() {
//!     Payload::Select { rows, .. } => rows,
//!     _ => unreachable!(),
//! };
//! assert_eq!(rows, vec![vec![Value::I64(7)]]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod error;
pub mod executor;
mod float;
pub mod parser;
pub mod schema;
pub mod storage;
pub mod types;
pub mod value;

pub use error::{SqlError, SqlResult};
pub use executor::{Engine, Payload, Variable};
pub use parser::{parse_statement, split_statements};
pub use schema::{ColumnDef, Row, Schema};
pub use storage::{Storage, StorageConfig, StorageError, StorageResult};
pub use types::ColumnType;
pub use value::{Interval, Value};
