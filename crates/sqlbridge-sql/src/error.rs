//! Error types for parsing and execution.

use thiserror::Error;

use crate::storage::StorageError;

/// SQL error type.
#[derive(Debug, Error)]
pub enum SqlError {
    /// SQL syntax error.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Statement or expression the engine does not support.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Empty statement.
    #[error("empty statement")]
    EmptyStatement,

    /// Table not found.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// Table already exists.
    #[error("table already exists: {0}")]
    TableExists(String),

    /// Column not found.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// Row arity or column list mismatch.
    #[error("column count mismatch: expected {expected}, got {actual}")]
    ColumnCountMismatch {
        /// Columns expected.
        expected: usize,
        /// Values supplied.
        actual: usize,
    },

    /// NULL written into a NOT NULL column.
    #[error("null value in non-nullable column {0}")]
    NullViolation(String),

    /// Duplicate value in a unique column.
    #[error("duplicate value {value} in unique column {column}")]
    UniqueViolation {
        /// Column name.
        column: String,
        /// Offending value.
        value: String,
    },

    /// Value cannot be coerced to the target type.
    #[error("cannot convert {value} to {target}")]
    Incompatible {
        /// Source value, rendered.
        value: String,
        /// Target type name.
        target: String,
    },

    /// Operator applied to operands it does not accept.
    #[error("invalid operands for {op}: {left} and {right}")]
    InvalidOperands {
        /// Operator.
        op: String,
        /// Left operand type.
        left: String,
        /// Right operand type.
        right: String,
    },

    /// Integer overflow or underflow.
    #[error("numeric overflow in {0}")]
    Overflow(String),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Transaction state error.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// Storage error.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<sqlparser::parser::ParserError> for SqlError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        SqlError::Syntax(err.to_string())
    }
}

/// Result type for SQL operations.
pub type SqlResult<T> = Result<T, SqlError>;
