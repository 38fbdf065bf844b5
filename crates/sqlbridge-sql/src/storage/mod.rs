//! Pluggable table storage.
//!
//! The executor talks to storage only through the [`Storage`] trait. Three
//! backends are provided:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                        Engine                           │
//! └────────────────────────────┬────────────────────────────┘
//!                              │ Box<dyn Storage>
//!        ┌─────────────────────┼──────────────────────┐
//!        ▼                     ▼                      ▼
//! ┌──────────────┐   ┌──────────────────┐   ┌────────────────────┐
//! │MemoryStorage │   │   JsonStorage    │   │SharedMemoryStorage │
//! │ owned tables │   │ one JSON file    │   │ named, per process │
//! └──────────────┘   └──────────────────┘   └────────────────────┘
//! ```
//!
//! All three keep a [`Database`] of tables. Transactions snapshot it on
//! `begin` and restore the snapshot on `rollback`.

mod error;
mod json;
mod memory;
mod shared;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::schema::{Row, Schema};

pub use error::{StorageError, StorageResult};
pub use json::JsonStorage;
pub use memory::MemoryStorage;
pub use shared::SharedMemoryStorage;

/// Storage capability used by the engine.
pub trait Storage: Send {
    /// Short backend name used in logs.
    fn name(&self) -> &str;

    /// Fetches the schema of a table.
    fn fetch_schema(&self, table: &str) -> StorageResult<Option<Schema>>;

    /// Fetches all schemas, ordered by table name.
    fn fetch_schemas(&self) -> StorageResult<Vec<Schema>>;

    /// Returns all rows of a table.
    fn scan_rows(&self, table: &str) -> StorageResult<Vec<Row>>;

    /// Creates a table.
    fn insert_schema(&mut self, schema: &Schema) -> StorageResult<()>;

    /// Drops a table and its rows.
    fn delete_schema(&mut self, table: &str) -> StorageResult<()>;

    /// Appends rows to a table.
    fn append_rows(&mut self, table: &str, rows: Vec<Row>) -> StorageResult<()>;

    /// Replaces every row of a table.
    fn replace_rows(&mut self, table: &str, rows: Vec<Row>) -> StorageResult<()>;

    /// Starts a transaction.
    fn begin(&mut self) -> StorageResult<()>;

    /// Commits the current transaction.
    fn commit(&mut self) -> StorageResult<()>;

    /// Rolls back the current transaction.
    fn rollback(&mut self) -> StorageResult<()>;
}

/// A table: schema plus rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table schema.
    pub schema: Schema,
    /// Table rows.
    pub rows: Vec<Row>,
}

/// The set of tables held by a backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    tables: BTreeMap<String, Table>,
}

impl Database {
    fn key(table: &str) -> String {
        table.to_ascii_lowercase()
    }

    fn table(&self, table: &str) -> StorageResult<&Table> {
        self.tables
            .get(&Self::key(table))
            .ok_or_else(|| StorageError::TableNotFound(table.to_string()))
    }

    fn table_mut(&mut self, table: &str) -> StorageResult<&mut Table> {
        self.tables
            .get_mut(&Self::key(table))
            .ok_or_else(|| StorageError::TableNotFound(table.to_string()))
    }

    pub(crate) fn fetch_schema(&self, table: &str) -> Option<Schema> {
        self.tables
            .get(&Self::key(table))
            .map(|t| t.schema.clone())
    }

    pub(crate) fn fetch_schemas(&self) -> Vec<Schema> {
        self.tables
            .values()
            .map(|t| t.schema.clone())
            .collect()
    }

    pub(crate) fn scan_rows(&self, table: &str) -> StorageResult<Vec<Row>> {
        Ok(self.table(table)?.rows.clone())
    }

    pub(crate) fn insert_schema(&mut self, schema: &Schema) -> StorageResult<()> {
        let key = Self::key(&schema.table_name);
        if self.tables.contains_key(&key) {
            return Err(StorageError::TableExists(schema.table_name.clone()));
        }
        self.tables.insert(
            key,
            Table {
                schema: schema.clone(),
                rows: Vec::new(),
            },
        );
        Ok(())
    }

    pub(crate) fn delete_schema(&mut self, table: &str) -> StorageResult<()> {
        self.tables
            .remove(&Self::key(table))
            .map(|_| ())
            .ok_or_else(|| StorageError::TableNotFound(table.to_string()))
    }

    pub(crate) fn append_rows(&mut self, table: &str, rows: Vec<Row>) -> StorageResult<()> {
        self.table_mut(table)?.rows.extend(rows);
        Ok(())
    }

    pub(crate) fn replace_rows(&mut self, table: &str, rows: Vec<Row>) -> StorageResult<()> {
        self.table_mut(table)?.rows = rows;
        Ok(())
    }

    /// Returns the number of tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

/// Storage selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Ephemeral, process-local tables.
    #[default]
    Memory,
    /// Tables persisted to a JSON file.
    Json {
        /// File path.
        path: PathBuf,
    },
    /// Tables shared by every handle opened with the same name.
    SharedMemory {
        /// Namespace name.
        name: String,
    },
}

impl StorageConfig {
    /// Opens the configured backend.
    pub fn open(&self) -> StorageResult<Box<dyn Storage>> {
        match self {
            StorageConfig::Memory => Ok(memory()),
            StorageConfig::Json { path } => json(path),
            StorageConfig::SharedMemory { name } => shared_memory(name),
        }
    }
}

/// Opens an ephemeral in-memory store.
pub fn memory() -> Box<dyn Storage> {
    Box::new(MemoryStorage::new())
}

/// Opens a JSON-file store, creating the file on first write.
pub fn json(path: impl Into<PathBuf>) -> StorageResult<Box<dyn Storage>> {
    Ok(Box::new(JsonStorage::open(path)?))
}

/// Opens a named shared-memory store.
pub fn shared_memory(name: &str) -> StorageResult<Box<dyn Storage>> {
    Ok(Box::new(SharedMemoryStorage::open(name)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDef;
    use crate::types::ColumnType;
    use crate::value::Value;

    #[test]
    fn test_database_catalog() {
        let mut db = Database::default();
        let schema = Schema::new("Items", vec![ColumnDef::new("id", ColumnType::Int64)]);
        db.insert_schema(&schema).unwrap();
        assert!(matches!(
            db.insert_schema(&schema),
            Err(StorageError::TableExists(_))
        ));

        db.append_rows("items", vec![vec![Value::I64(1)], vec![Value::I64(2)]])
            .unwrap();
        assert_eq!(db.scan_rows("ITEMS").unwrap().len(), 2);

        db.replace_rows("items", vec![]).unwrap();
        assert!(db.scan_rows("items").unwrap().is_empty());

        db.delete_schema("items").unwrap();
        assert!(matches!(
            db.scan_rows("items"),
            Err(StorageError::TableNotFound(_))
        ));
        assert_eq!(db.table_count(), 0);
    }

    #[test]
    fn test_storage_config_serde() {
        let config: StorageConfig =
            serde_json::from_str(r#"{"kind": "shared_memory", "name": "cache"}"#).unwrap();
        assert_eq!(
            config,
            StorageConfig::SharedMemory {
                name: "cache".to_string()
            }
        );
        assert_eq!(StorageConfig::default(), StorageConfig::Memory);
    }
}
