//! JSON-file storage.
//!
//! The whole database is one pretty-printed JSON document. Outside a
//! transaction every mutation rewrites the file; inside one, writes are
//! deferred until commit. The file is replaced atomically through a
//! sibling temporary file, and the in-memory state only changes once that
//! write has succeeded.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{Database, Storage, StorageError, StorageResult};
use crate::schema::{Row, Schema};

/// Storage persisted to a JSON file.
#[derive(Debug)]
pub struct JsonStorage {
    path: PathBuf,
    db: Database,
    snapshot: Option<Database>,
}

impl JsonStorage {
    /// Opens the store at `path`. A missing file is an empty database.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        if path.is_dir() {
            return Err(StorageError::InvalidConfig(format!(
                "{} is a directory",
                path.display()
            )));
        }

        let db = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Database::default(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Database::default(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        info!(
            path = %path.display(),
            tables = db.table_count(),
            "opened json storage"
        );
        Ok(Self {
            path,
            db,
            snapshot: None,
        })
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, db: &Database) -> StorageResult<()> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let bytes = serde_json::to_vec_pretty(db)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        debug!(path = %self.path.display(), "flushed json storage");
        Ok(())
    }

    /// Applies `change`. Outside a transaction it runs on a copy that
    /// replaces the live database once written to disk.
    fn apply<F>(&mut self, change: F) -> StorageResult<()>
    where
        F: FnOnce(&mut Database) -> StorageResult<()>,
    {
        if self.snapshot.is_some() {
            return change(&mut self.db);
        }
        let mut next = self.db.clone();
        change(&mut next)?;
        self.write(&next)?;
        self.db = next;
        Ok(())
    }
}

impl Storage for JsonStorage {
    fn name(&self) -> &str {
        "json"
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
        self.apply(|db| db.insert_schema(schema))
    }

    fn delete_schema(&mut self, table: &str) -> StorageResult<()> {
        self.apply(|db| db.delete_schema(table))
    }

    fn append_rows(&mut self, table: &str, rows: Vec<Row>) -> StorageResult<()> {
        self.apply(|db| db.append_rows(table, rows))
    }

    fn replace_rows(&mut self, table: &str, rows: Vec<Row>) -> StorageResult<()> {
        self.apply(|db| db.replace_rows(table, rows))
    }

    fn begin(&mut self) -> StorageResult<()> {
        if self.snapshot.is_some() {
            return Err(StorageError::Transaction(
                "transaction already in progress".to_string(),
            ));
        }
        self.snapshot = Some(self.db.clone());
        Ok(())
    }

    fn commit(&mut self) -> StorageResult<()> {
        if self.snapshot.is_none() {
            return Err(StorageError::Transaction(
                "no transaction in progress".to_string(),
            ));
        }
        // A failed write leaves the transaction open for a retry or rollback.
        self.write(&self.db)?;
        self.snapshot = None;
        Ok(())
    }

    fn rollback(&mut self) -> StorageResult<()> {
        self.db = self
            .snapshot
            .take()
            .ok_or_else(|| StorageError::Transaction("no transaction in progress".to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDef;
    use crate::types::ColumnType;
    use crate::value::Value;
    use tempfile::TempDir;

    fn schema() -> Schema {
        Schema::new("notes", vec![ColumnDef::new("body", ColumnType::Text)])
    }

    #[test]
    fn test_persists_across_opens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");

        {
            let mut store = JsonStorage::open(&path).unwrap();
            store.insert_schema(&schema()).unwrap();
            store
                .append_rows("notes", vec![vec![Value::Str("hello".into())]])
                .unwrap();
        }
        assert!(path.exists());

        let store = JsonStorage::open(&path).unwrap();
        assert_eq!(store.fetch_schema("notes").unwrap(), Some(schema()));
        assert_eq!(
            store.scan_rows("notes").unwrap(),
            vec![vec![Value::Str("hello".into())]]
        );
    }

    #[test]
    fn test_transaction_defers_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("db.json");

        let mut store = JsonStorage::open(&path).unwrap();
        store.begin().unwrap();
        store.insert_schema(&schema()).unwrap();
        assert!(!path.exists());

        store.commit().unwrap();
        assert!(path.exists());

        store.begin().unwrap();
        store.delete_schema("notes").unwrap();
        store.rollback().unwrap();
        assert!(store.fetch_schema("notes").unwrap().is_some());
    }

    #[test]
    fn test_failed_write_leaves_state_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        let mut store = JsonStorage::open(&path).unwrap();
        store.insert_schema(&schema()).unwrap();

        // A directory where the temporary file goes makes every write fail.
        let tmp = path.with_extension("json.tmp");
        fs::create_dir(&tmp).unwrap();
        assert!(matches!(
            store.append_rows("notes", vec![vec![Value::Str("lost".into())]]),
            Err(StorageError::Io { .. })
        ));
        assert!(store.scan_rows("notes").unwrap().is_empty());
        assert!(store.delete_schema("notes").is_err());
        assert!(store.fetch_schema("notes").unwrap().is_some());

        store.begin().unwrap();
        store
            .append_rows("notes", vec![vec![Value::Str("kept".into())]])
            .unwrap();
        assert!(store.commit().is_err());
        assert!(store.rollback().is_ok());
        assert!(store.scan_rows("notes").unwrap().is_empty());

        fs::remove_dir(&tmp).unwrap();
        store
            .append_rows("notes", vec![vec![Value::Str("saved".into())]])
            .unwrap();
        let reopened = JsonStorage::open(&path).unwrap();
        assert_eq!(
            reopened.scan_rows("notes").unwrap(),
            vec![vec![Value::Str("saved".into())]]
        );
    }

    #[test]
    fn test_non_finite_floats_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        let table = Schema::new(
            "readings",
            vec![
                ColumnDef::new("wide", ColumnType::Float64),
                ColumnDef::new("narrow", ColumnType::Float32),
                ColumnDef::new("at", ColumnType::Point),
            ],
        );
        let row = vec![
            Value::F64(f64::NEG_INFINITY),
            Value::F32(f32::INFINITY),
            Value::Point {
                x: f64::INFINITY,
                y: 0.1 + 0.2,
            },
        ];
        {
            let mut store = JsonStorage::open(&path).unwrap();
            store.insert_schema(&table).unwrap();
            store.append_rows("readings", vec![row.clone()]).unwrap();
            store
                .append_rows("readings", vec![vec![Value::F64(f64::NAN), Value::Null, Value::Null]])
                .unwrap();
        }

        let store = JsonStorage::open(&path).unwrap();
        let rows = store.scan_rows("readings").unwrap();
        assert_eq!(rows[0], row);
        assert!(matches!(rows[1][0], Value::F64(v) if v.is_nan()));
    }

    #[test]
    fn test_open_rejects_directory_and_garbage() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            JsonStorage::open(dir.path()),
            Err(StorageError::InvalidConfig(_))
        ));

        let path = dir.path().join("bad.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            JsonStorage::open(&path),
            Err(StorageError::Encoding(_))
        ));
    }
}
