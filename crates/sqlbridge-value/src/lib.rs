//! # sqlbridge-value
//!
//! Value model for data leaving the SQL engine.
//!
//! `SqlValue` is a closed tagged union covering every datum a query can
//! produce. Its guarantees:
//!
//! - **Exact integers**: unsigned integers are widened into the next larger
//!   signed slot, integers beyond 64 bits travel as decimal `BigInt` text.
//! - **Validated payloads**: temporal, network and identifier payloads are
//!   checked at construction and again when decoded.
//! - **Lossless nesting**: lists and maps of values nest to any depth.
//!
//! ## Quick Start
//!
//! ```rust
//! use sqlbridge_value::{wire, SqlValue, ValueKind};
//!
//! let row = SqlValue::try_map_from_pairs([
//!     ("id", SqlValue::from(255u8)),
//!     ("big", SqlValue::big_int("123456789012345678901234567890").unwrap()),
//! ])
//! .unwrap();
//!
//! assert_eq!(row.kind(), ValueKind::SqlMap);
//! let text = wire::encode(&row).unwrap();
//! assert_eq!(wire::decode(&text).unwrap(), row);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Error types.
pub mod error;

/// Validated payload types.
pub mod types;

/// The `SqlValue` union.
pub mod value;

/// JSON wire codec.
pub mod wire;

pub use error::{ValueError, ValueResult};
pub use types::{
    BigInt, Date, Inet, Interval, Point, Time, Timestamp, Uuid, WideU16, WideU32, WideU8,
    DATE_FORMAT, TIMESTAMP_FORMAT, TIME_FORMAT,
};
pub use value::{SqlValue, ValueKind};
