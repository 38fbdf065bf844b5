//! Per-statement query results.

use sqlbridge_value::SqlValue;

/// Outcome of one executed statement.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// CREATE TABLE
    Create,
    /// INSERT
    Insert {
        /// Rows inserted.
        rows: u64,
    },
    /// UPDATE
    Update {
        /// Rows updated.
        rows: u64,
    },
    /// DELETE
    Delete {
        /// Rows deleted.
        rows: u64,
    },
    /// SELECT
    Select {
        /// Column labels.
        labels: Vec<String>,
        /// Result rows.
        rows: Vec<Vec<SqlValue>>,
    },
    /// DROP TABLE
    DropTable {
        /// Tables dropped.
        count: u64,
    },
    /// BEGIN
    StartTransaction,
    /// COMMIT
    Commit,
    /// ROLLBACK
    Rollback,
    /// SHOW TABLES / SHOW VERSION
    ShowVariable {
        /// Variable name, lowercase.
        name: String,
        /// Variable value.
        value: SqlValue,
    },
    /// SHOW COLUMNS
    ShowColumns {
        /// `(name, type)` pairs.
        columns: Vec<(String, String)>,
    },
}

impl QueryResult {
    /// Rows affected by INSERT, UPDATE or DELETE.
    pub fn rows_affected(&self) -> Option<u64> {
        match self {
            QueryResult::Insert { rows }
            | QueryResult::Update { rows }
            | QueryResult::Delete { rows } => Some(*rows),
            _ => None,
        }
    }

    /// Returns labels and rows of a SELECT.
    pub fn as_select(&self) -> Option<(&[String], &[Vec<SqlValue>])> {
        match self {
            QueryResult::Select { labels, rows } => Some((labels, rows)),
            _ => None,
        }
    }

    /// Short name of the statement kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            QueryResult::Create => "CREATE TABLE",
            QueryResult::Insert { .. } => "INSERT",
            QueryResult::Update { .. } => "UPDATE",
            QueryResult::Delete { .. } => "DELETE",
            QueryResult::Select { .. } => "SELECT",
            QueryResult::DropTable { .. } => "DROP TABLE",
            QueryResult::StartTransaction => "BEGIN",
            QueryResult::Commit => "COMMIT",
            QueryResult::Rollback => "ROLLBACK",
            QueryResult::ShowVariable { .. } => "SHOW",
            QueryResult::ShowColumns { .. } => "SHOW COLUMNS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers() {
        let insert = QueryResult::Insert { rows: 3 };
        assert_eq!(insert.rows_affected(), Some(3));
        assert_eq!(insert.kind_name(), "INSERT");
        assert!(insert.as_select().is_none());

        let select = QueryResult::Select {
            labels: vec!["a".into()],
            rows: vec![vec![SqlValue::I64(1)]],
        };
        let (labels, rows) = select.as_select().unwrap();
        assert_eq!(labels, ["a".to_string()]);
        assert_eq!(rows[0][0], SqlValue::I64(1));
        assert_eq!(select.rows_affected(), None);
        assert_eq!(QueryResult::Commit.kind_name(), "COMMIT");
    }
}
