//! # sqlbridge-test
//!
//! Integration tests for sqlbridge.
//!
//! This crate contains:
//! - Client tests over every storage backend
//! - Value model property tests
//! - Test utilities shared by both

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::path::PathBuf;
use std::sync::Once;
use std::time::Duration;

use sqlbridge_client::{Glue, QueryResult, SqlValue};
use sqlbridge_sql::schema::{Row, Schema};
use sqlbridge_sql::{Storage, StorageResult};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs a test log subscriber once. Honors `RUST_LOG`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Returns a shared-memory name no other test uses.
pub fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}

/// A temporary directory holding one JSON database file.
pub struct TempJson {
    dir: TempDir,
}

impl TempJson {
    /// Creates an empty temporary directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    /// Path of the database file inside the directory.
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("db.json")
    }
}

impl Default for TempJson {
    fn default() -> Self {
        Self::new()
    }
}

/// Storage wrapper that sleeps before every table scan.
pub struct SlowStorage {
    inner: Box<dyn Storage>,
    delay: Duration,
}

impl SlowStorage {
    /// Wraps `inner`, delaying each scan by `delay`.
    pub fn new(inner: Box<dyn Storage>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

impl Storage for SlowStorage {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch_schema(&self, table: &str) -> StorageResult<Option<Schema>> {
        self.inner.fetch_schema(table)
    }

    fn fetch_schemas(&self) -> StorageResult<Vec<Schema>> {
        self.inner.fetch_schemas()
    }

    fn scan_rows(&self, table: &str) -> StorageResult<Vec<Row>> {
        std::thread::sleep(self.delay);
        self.inner.scan_rows(table)
    }

    fn insert_schema(&mut self, schema: &Schema) -> StorageResult<()> {
        self.inner.insert_schema(schema)
    }

    fn delete_schema(&mut self, table: &str) -> StorageResult<()> {
        self.inner.delete_schema(table)
    }

    fn append_rows(&mut self, table: &str, rows: Vec<Row>) -> StorageResult<()> {
        self.inner.append_rows(table, rows)
    }

    fn replace_rows(&mut self, table: &str, rows: Vec<Row>) -> StorageResult<()> {
        self.inner.replace_rows(table, rows)
    }

    fn begin(&mut self) -> StorageResult<()> {
        self.inner.begin()
    }

    fn commit(&mut self) -> StorageResult<()> {
        self.inner.commit()
    }

    fn rollback(&mut self) -> StorageResult<()> {
        self.inner.rollback()
    }
}

/// Runs a single-statement query and returns its rows.
///
/// Panics if the query fails or is not a `SELECT`.
pub fn select_rows(glue: &Glue, sql: &str) -> Vec<Vec<SqlValue>> {
    let mut results = glue
        .query(sql)
        .unwrap_or_else(|e| panic!("query {sql:?} failed: {e}"));
    assert_eq!(results.len(), 1, "expected one result for {sql:?}");
    match results.remove(0) {
        QueryResult::Select { rows, .. } => rows,
        other => panic!("expected SELECT result, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlbridge_client::storage;

    #[test]
    fn test_unique_names_differ() {
        assert_ne!(unique_name("t"), unique_name("t"));
    }

    #[test]
    fn test_slow_storage_delegates() {
        let glue = Glue::new(Box::new(SlowStorage::new(
            storage::memory(),
            Duration::from_millis(1),
        )))
        .unwrap();
        glue.query("CREATE TABLE t (id INTEGER); INSERT INTO t VALUES (7)")
            .unwrap();
        assert_eq!(select_rows(&glue, "SELECT id FROM t"), vec![vec![SqlValue::I64(7)]]);
        assert_eq!(glue.storage_name(), "memory");
    }
}
