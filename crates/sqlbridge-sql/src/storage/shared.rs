//! Named shared-memory storage.
//!
//! Handles opened with the same name share one database for the life of
//! the process. A transaction snapshots the shared database and a rollback
//! writes the snapshot back, which also discards changes other handles
//! made in between.

use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;

use super::{Database, Storage, StorageError, StorageResult};
use crate::schema::{Row, Schema};

static REGISTRY: LazyLock<DashMap<String, Arc<RwLock<Database>>>> = LazyLock::new(DashMap::new);

/// Storage shared by name within the process.
#[derive(Debug)]
pub struct SharedMemoryStorage {
    name: String,
    db: Arc<RwLock<Database>>,
    snapshot: Option<Database>,
}

impl SharedMemoryStorage {
    /// Opens or creates the named store.
    pub fn open(name: &str) -> StorageResult<Self> {
        if name.trim().is_empty() {
            return Err(StorageError::InvalidConfig(
                "shared memory name must not be empty".to_string(),
            ));
        }
        let db = REGISTRY
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(Database::default())))
            .clone();
        debug!(name, handles = Arc::strong_count(&db), "opened shared memory storage");
        Ok(Self {
            name: name.to_string(),
            db,
            snapshot: None,
        })
    }

    /// Returns the namespace name.
    pub fn namespace(&self) -> &str {
        &self.name
    }

    /// Drops the named store from the registry. Open handles keep their data.
    pub fn release(name: &str) -> bool {
        REGISTRY.remove(name).is_some()
    }
}

impl Storage for SharedMemoryStorage {
    fn name(&self) -> &str {
        "shared_memory"
    }

    fn fetch_schema(&self, table: &str) -> StorageResult<Option<Schema>> {
        Ok(self.db.read().fetch_schema(table))
    }

    fn fetch_schemas(&self) -> StorageResult<Vec<Schema>> {
        Ok(self.db.read().fetch_schemas())
    }

    fn scan_rows(&self, table: &str) -> StorageResult<Vec<Row>> {
        self.db.read().scan_rows(table)
    }

    fn insert_schema(&mut self, schema: &Schema) -> StorageResult<()> {
        self.db.write().insert_schema(schema)
    }

    fn delete_schema(&mut self, table: &str) -> StorageResult<()> {
        self.db.write().delete_schema(table)
    }

    fn append_rows(&mut self, table: &str, rows: Vec<Row>) -> StorageResult<()> {
        self.db.write().append_rows(table, rows)
    }

    fn replace_rows(&mut self, table: &str, rows: Vec<Row>) -> StorageResult<()> {
        self.db.write().replace_rows(table, rows)
    }

    fn begin(&mut self) -> StorageResult<()> {
        if self.snapshot.is_some() {
            return Err(StorageError::Transaction(
                "transaction already in progress".to_string(),
            ));
        }
        self.snapshot = Some(self.db.read().clone());
        Ok(())
    }

    fn commit(&mut self) -> StorageResult<()> {
        self.snapshot
            .take()
            .map(|_| ())
            .ok_or_else(|| StorageError::Transaction("no transaction in progress".to_string()))
    }

    fn rollback(&mut self) -> StorageResult<()> {
        let snapshot = self
            .snapshot
            .take()
            .ok_or_else(|| StorageError::Transaction("no transaction in progress".to_string()))?;
        *self.db.write() = snapshot;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDef;
    use crate::types::ColumnType;
    use crate::value::Value;

    #[test]
    fn test_same_name_shares_tables() {
        let mut writer = SharedMemoryStorage::open("shared-unit-a").unwrap();
        let reader = SharedMemoryStorage::open("shared-unit-a").unwrap();
        let other = SharedMemoryStorage::open("shared-unit-b").unwrap();

        writer
            .insert_schema(&Schema::new(
                "t",
                vec![ColumnDef::new("v", ColumnType::Int32)],
            ))
            .unwrap();
        writer.append_rows("t", vec![vec![Value::I32(5)]]).unwrap();

        assert_eq!(reader.scan_rows("t").unwrap(), vec![vec![Value::I32(5)]]);
        assert!(other.fetch_schema("t").unwrap().is_none());
        assert_eq!(reader.namespace(), "shared-unit-a");

        assert!(SharedMemoryStorage::release("shared-unit-a"));
        assert!(SharedMemoryStorage::open("shared-unit-a")
            .unwrap()
            .fetch_schemas()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(matches!(
            SharedMemoryStorage::open("  "),
            Err(StorageError::InvalidConfig(_))
        ));
    }
}
