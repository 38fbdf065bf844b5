//! Table schemas and rows.

use serde::{Deserialize, Serialize};

use crate::types::ColumnType;
use crate::value::Value;

/// A row of values, in schema column order.
pub type Row = Vec<Value>;

/// A column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Column type.
    pub data_type: ColumnType,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Whether values must be unique.
    pub unique: bool,
}

impl ColumnDef {
    /// Creates a nullable, non-unique column.
    pub fn new(name: impl Into<String>, data_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            unique: false,
        }
    }

    /// Marks the column NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Marks the column as a primary key.
    pub fn primary_key(mut self) -> Self {
        self.nullable = false;
        self.unique = true;
        self
    }
}

/// A table schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Table name.
    pub table_name: String,
    /// Columns in storage order.
    pub columns: Vec<ColumnDef>,
}

impl Schema {
    /// Creates a schema.
    pub fn new(table_name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            table_name: table_name.into(),
            columns,
        }
    }

    /// Returns the index of a column by name, case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Returns column names in order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_lookup_is_case_insensitive() {
        let schema = Schema::new(
            "users",
            vec![
                ColumnDef::new("id", ColumnType::Int64).primary_key(),
                ColumnDef::new("Name", ColumnType::Text).not_null(),
            ],
        );
        assert_eq!(schema.column_index("ID"), Some(0));
        assert_eq!(schema.column_index("name"), Some(1));
        assert_eq!(schema.column_index("missing"), None);
        assert!(schema.columns[0].unique && !schema.columns[0].nullable);
        assert_eq!(schema.column_names(), vec!["id", "Name"]);
    }
}
