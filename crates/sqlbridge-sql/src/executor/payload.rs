//! Statement results produced by the engine.

use crate::types::ColumnType;
use crate::value::Value;

/// Result of executing one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// CREATE TABLE
    Create,
    /// DROP TABLE with the number of tables dropped.
    DropTable(u64),
    /// INSERT with rows inserted.
    Insert(u64),
    /// UPDATE with rows updated.
    Update(u64),
    /// DELETE with rows deleted.
    Delete(u64),
    /// SELECT output.
    Select {
        /// Column labels.
        labels: Vec<String>,
        /// Result rows.
        rows: Vec<Vec<Value>>,
    },
    /// BEGIN
    StartTransaction,
    /// COMMIT
    Commit,
    /// ROLLBACK
    Rollback,
    /// SHOW TABLES / SHOW VERSION
    ShowVariable(Variable),
    /// SHOW COLUMNS
    ShowColumns(Vec<(String, ColumnType)>),
}

/// Value reported by a SHOW statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Variable {
    /// Table names.
    Tables(Vec<String>),
    /// Engine version.
    Version(String),
}

impl Payload {
    /// Rows affected by a write, or `None` for other statements.
    pub fn rows_affected(&self) -> Option<u64> {
        match self {
            Payload::Insert(n) | Payload::Update(n) | Payload::Delete(n) => Some(*n),
            _ => None,
        }
    }
}
