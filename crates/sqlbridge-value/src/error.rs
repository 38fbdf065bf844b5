//! Error types for value construction and decoding.

use thiserror::Error;

use crate::value::ValueKind;

/// Value error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The input violates the contract of the requested variant.
    #[error("invalid {kind} value {input:?}: {reason}")]
    InvalidValue {
        /// Variant that was being constructed.
        kind: ValueKind,
        /// Offending input, rendered as text.
        input: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The wire payload could not be decoded.
    #[error("codec error: {0}")]
    Codec(String),
}

impl ValueError {
    /// Creates an `InvalidValue` error.
    pub fn invalid(kind: ValueKind, input: impl Into<String>, reason: impl Into<String>) -> Self {
        ValueError::InvalidValue {
            kind,
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Returns the variant kind for `InvalidValue` errors.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            ValueError::InvalidValue { kind, .. } => Some(*kind),
            ValueError::Codec(_) => None,
        }
    }
}

impl From<serde_json::Error> for ValueError {
    fn from(err: serde_json::Error) -> Self {
        ValueError::Codec(err.to_string())
    }
}

/// Result type for value operations.
pub type ValueResult<T> = Result<T, ValueError>;
