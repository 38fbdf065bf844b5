//! In-memory storage.

use tracing::debug;

use super::{Database, Storage, StorageError, StorageResult};
use crate::schema::{Row, Schema};

/// Ephemeral storage owned by a single engine.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    db: Database,
    snapshot: Option<Database>,
}

impl MemoryStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }
}

impl Storage for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch_schema(&self, table: &str) -> StorageResult<Option<Schema>> {
        Ok(self.db.fetch_schema(table))
    }

    fn fetch_schemas(&self) -> StorageResult<Vec<Schema>> {
        Ok(self.db.fetch_schemas())
    }

    fn scan_rows(&self, table: &str) -> StorageResult<Vec<Row>> {
        self.db.scan_rows(table)
    }

    fn insert_schema(&mut self, schema: &Schema) -> StorageResult<()> {
        self.db.insert_schema(schema)
    }

    fn delete_schema(&mut self, table: &str) -> StorageResult<()> {
        self.db.delete_schema(table)
    }

    fn append_rows(&mut self, table: &str, rows: Vec<Row>) -> StorageResult<()> {
        self.db.append_rows(table, rows)
    }

    fn replace_rows(&mut self, table: &str, rows: Vec<Row>) -> StorageResult<()> {
        self.db.replace_rows(table, rows)
    }

    fn begin(&mut self) -> StorageResult<()> {
        if self.snapshot.is_some() {
            return Err(StorageError::Transaction(
                "transaction already in progress".to_string(),
            ));
        }
        self.snapshot = Some(self.db.clone());
        debug!("memory storage: begin");
        Ok(())
    }

    fn commit(&mut self) -> StorageResult<()> {
        self.snapshot
            .take()
            .map(|_| debug!("memory storage: commit"))
            .ok_or_else(|| StorageError::Transaction("no transaction in progress".to_string()))
    }

    fn rollback(&mut self) -> StorageResult<()> {
        let snapshot = self
            .snapshot
            .take()
            .ok_or_else(|| StorageError::Transaction("no transaction in progress".to_string()))?;
        self.db = snapshot;
        debug!("memory storage: rollback");
        Ok(())
    }
}
