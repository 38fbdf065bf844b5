//! Column types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SqlError, SqlResult};

/// A column data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// BOOLEAN
    Boolean,
    /// INT8 / TINYINT
    Int8,
    /// INT16 / SMALLINT
    Int16,
    /// INT32 / INT
    Int32,
    /// INTEGER / BIGINT / INT64
    Int64,
    /// INT128
    Int128,
    /// UINT8
    Uint8,
    /// UINT16
    Uint16,
    /// UINT32
    Uint32,
    /// UINT64
    Uint64,
    /// UINT128
    Uint128,
    /// FLOAT32 / REAL
    Float32,
    /// FLOAT / DOUBLE
    Float64,
    /// TEXT / VARCHAR
    Text,
    /// BYTEA
    Bytea,
    /// INET
    Inet,
    /// DATE
    Date,
    /// TIME
    Time,
    /// TIMESTAMP
    Timestamp,
    /// INTERVAL
    Interval,
    /// UUID
    Uuid,
    /// MAP
    Map,
    /// LIST
    List,
    /// POINT
    Point,
}

impl ColumnType {
    /// Resolves a type from its SQL spelling.
    ///
    /// Length and precision arguments such as `VARCHAR(255)` are ignored.
    pub fn from_sql_name(name: &str) -> SqlResult<Self> {
        let upper = name.trim().to_ascii_uppercase();
        let base = upper.split('(').next().unwrap_or_default().trim();
        let ty = match base {
            "BOOLEAN" | "BOOL" => ColumnType::Boolean,
            "INT8" | "TINYINT" => ColumnType::Int8,
            "INT16" | "SMALLINT" | "INT2" => ColumnType::Int16,
            "INT32" | "INT" | "INT4" => ColumnType::Int32,
            "INTEGER" | "BIGINT" | "INT64" => ColumnType::Int64,
            "INT128" => ColumnType::Int128,
            "UINT8" => ColumnType::Uint8,
            "UINT16" => ColumnType::Uint16,
            "UINT32" => ColumnType::Uint32,
            "UINT64" => ColumnType::Uint64,
            "UINT128" => ColumnType::Uint128,
            "FLOAT32" | "REAL" | "FLOAT4" => ColumnType::Float32,
            "FLOAT" | "FLOAT64" | "FLOAT8" | "DOUBLE" | "DOUBLE PRECISION" => ColumnType::Float64,
            "TEXT" | "VARCHAR" | "STRING" | "CHAR" | "CHARACTER VARYING" => ColumnType::Text,
            "BYTEA" | "BLOB" | "BINARY" | "VARBINARY" => ColumnType::Bytea,
            "INET" => ColumnType::Inet,
            "DATE" => ColumnType::Date,
            "TIME" => ColumnType::Time,
            "TIMESTAMP" | "DATETIME" => ColumnType::Timestamp,
            "INTERVAL" => ColumnType::Interval,
            "UUID" => ColumnType::Uuid,
            "MAP" => ColumnType::Map,
            "LIST" => ColumnType::List,
            "POINT" => ColumnType::Point,
            _ => return Err(SqlError::Unsupported(format!("data type {}", name))),
        };
        Ok(ty)
    }

    /// Returns the canonical SQL spelling.
    pub fn sql_name(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Int8 => "INT8",
            ColumnType::Int16 => "INT16",
            ColumnType::Int32 => "INT32",
            ColumnType::Int64 => "INT64",
            ColumnType::Int128 => "INT128",
            ColumnType::Uint8 => "UINT8",
            ColumnType::Uint16 => "UINT16",
            ColumnType::Uint32 => "UINT32",
            ColumnType::Uint64 => "UINT64",
            ColumnType::Uint128 => "UINT128",
            ColumnType::Float32 => "FLOAT32",
            ColumnType::Float64 => "FLOAT64",
            ColumnType::Text => "TEXT",
            ColumnType::Bytea => "BYTEA",
            ColumnType::Inet => "INET",
            ColumnType::Date => "DATE",
            ColumnType::Time => "TIME",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Interval => "INTERVAL",
            ColumnType::Uuid => "UUID",
            ColumnType::Map => "MAP",
            ColumnType::List => "LIST",
            ColumnType::Point => "POINT",
        }
    }

    /// Returns true for integer types.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ColumnType::Int8
                | ColumnType::Int16
                | ColumnType::Int32
                | ColumnType::Int64
                | ColumnType::Int128
                | ColumnType::Uint8
                | ColumnType::Uint16
                | ColumnType::Uint32
                | ColumnType::Uint64
                | ColumnType::Uint128
        )
    }

    /// Returns true for floating point types.
    pub fn is_float(&self) -> bool {
        matches!(self, ColumnType::Float32 | ColumnType::Float64)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_aliases() {
        assert_eq!(ColumnType::from_sql_name("integer").unwrap(), ColumnType::Int64);
        assert_eq!(ColumnType::from_sql_name("INT").unwrap(), ColumnType::Int32);
        assert_eq!(ColumnType::from_sql_name("VARCHAR(255)").unwrap(), ColumnType::Text);
        assert_eq!(ColumnType::from_sql_name("UInt8").unwrap(), ColumnType::Uint8);
        assert_eq!(ColumnType::from_sql_name("DOUBLE PRECISION").unwrap(), ColumnType::Float64);
        assert!(ColumnType::from_sql_name("GEOMETRY").is_err());
    }

    #[test]
    fn test_sql_name_round_trip() {
        for ty in [ColumnType::Int128, ColumnType::Uuid, ColumnType::Map, ColumnType::Point] {
            assert_eq!(ColumnType::from_sql_name(ty.sql_name()).unwrap(), ty);
        }
    }
}
