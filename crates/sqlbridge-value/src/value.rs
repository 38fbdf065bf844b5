//! The `SqlValue` tagged union.
//!
//! Every datum that leaves the engine is one of these variants. The set is
//! closed, each instance carries exactly one tag, and containers own their
//! children, so values form finite trees.

use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{ValueError, ValueResult};
use crate::types::{
    BigInt, Date, Inet, Interval, Point, Time, Timestamp, Uuid, WideU16, WideU32, WideU8,
};
use crate::wire::{float32, float64};

/// A SQL value crossing the engine boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum SqlValue {
    /// Boolean.
    Bool(bool),
    /// 8-bit signed integer.
    I8(i8),
    /// 16-bit signed integer.
    I16(i16),
    /// 32-bit signed integer.
    I32(i32),
    /// 64-bit signed integer.
    I64(i64),
    /// 8-bit unsigned integer, widened to 16-bit signed.
    U8(WideU8),
    /// 16-bit unsigned integer, widened to 32-bit signed.
    U16(WideU16),
    /// 32-bit unsigned integer, widened to 64-bit signed.
    U32(WideU32),
    /// Single-precision float.
    F32(#[serde(with = "float32")] f32),
    /// Double-precision float.
    F64(#[serde(with = "float64")] f64),
    /// Arbitrary-precision integer in decimal form.
    BigInt(BigInt),
    /// UTF-8 text.
    Str(String),
    /// Binary blob.
    Bytes(#[serde(with = "hex")] Vec<u8>),
    /// IP address.
    Inet(Inet),
    /// Calendar date.
    Date(Date),
    /// Date and time.
    Timestamp(Timestamp),
    /// Time of day.
    Time(Time),
    /// Elapsed duration.
    Interval(Interval),
    /// 128-bit identifier.
    Uuid(Uuid),
    /// String-keyed map of values.
    SqlMap(HashMap<String, SqlValue>),
    /// Ordered list of values.
    SqlList(Vec<SqlValue>),
    /// Two-dimensional point.
    SqlPoint(Point),
    /// SQL NULL.
    #[default]
    Null,
}

static NULL: SqlValue = SqlValue::Null;

impl SqlValue {
    /// The NULL value.
    pub const NULL: SqlValue = SqlValue::Null;

    /// Returns the shared NULL instance.
    pub fn null_ref() -> &'static SqlValue {
        &NULL
    }

    /// Creates a list from anything that yields values.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        SqlValue::SqlList(items.into_iter().map(Into::into).collect())
    }

    /// Creates a map from an owned mapping.
    pub fn map(entries: HashMap<String, SqlValue>) -> Self {
        SqlValue::SqlMap(entries)
    }

    /// Creates a map from key/value pairs, rejecting duplicate keys.
    pub fn try_map_from_pairs<I, K, V>(pairs: I) -> ValueResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<SqlValue>,
    {
        let mut map = HashMap::new();
        for (key, value) in pairs {
            let key = key.into();
            if map.contains_key(&key) {
                return Err(ValueError::invalid(ValueKind::SqlMap, key, "duplicate key"));
            }
            map.insert(key, value.into());
        }
        Ok(SqlValue::SqlMap(map))
    }

    /// Creates a `BigInt` value from decimal text.
    pub fn big_int(text: impl Into<String>) -> ValueResult<Self> {
        BigInt::new(text).map(SqlValue::BigInt)
    }

    /// Creates a `Date` value from `YYYY-MM-DD` text.
    pub fn date(text: impl Into<String>) -> ValueResult<Self> {
        Date::new(text).map(SqlValue::Date)
    }

    /// Creates a `Time` value from `HH:MM:SS[.fff]` text.
    pub fn time(text: impl Into<String>) -> ValueResult<Self> {
        Time::new(text).map(SqlValue::Time)
    }

    /// Creates a `Timestamp` value from `YYYY-MM-DD HH:MM:SS[.fff]` text.
    pub fn timestamp(text: impl Into<String>) -> ValueResult<Self> {
        Timestamp::new(text).map(SqlValue::Timestamp)
    }

    /// Creates an `Interval` value.
    pub fn interval(text: impl Into<String>) -> ValueResult<Self> {
        Interval::new(text).map(SqlValue::Interval)
    }

    /// Creates an `Inet` value from an address literal.
    pub fn inet(text: impl Into<String>) -> ValueResult<Self> {
        Inet::new(text).map(SqlValue::Inet)
    }

    /// Creates a `Uuid` value from hyphenated text.
    pub fn uuid(text: impl Into<String>) -> ValueResult<Self> {
        Uuid::new(text).map(SqlValue::Uuid)
    }

    /// Creates a `Point` value.
    pub fn point(x: f64, y: f64) -> Self {
        SqlValue::SqlPoint(Point::new(x, y))
    }

    /// Returns the variant tag.
    pub fn kind(&self) -> ValueKind {
        match self {
            SqlValue::Bool(_) => ValueKind::Bool,
            SqlValue::I8(_) => ValueKind::I8,
            SqlValue::I16(_) => ValueKind::I16,
            SqlValue::I32(_) => ValueKind::I32,
            SqlValue::I64(_) => ValueKind::I64,
            SqlValue::U8(_) => ValueKind::U8,
            SqlValue::U16(_) => ValueKind::U16,
            SqlValue::U32(_) => ValueKind::U32,
            SqlValue::F32(_) => ValueKind::F32,
            SqlValue::F64(_) => ValueKind::F64,
            SqlValue::BigInt(_) => ValueKind::BigInt,
            SqlValue::Str(_) => ValueKind::Str,
            SqlValue::Bytes(_) => ValueKind::Bytes,
            SqlValue::Inet(_) => ValueKind::Inet,
            SqlValue::Date(_) => ValueKind::Date,
            SqlValue::Timestamp(_) => ValueKind::Timestamp,
            SqlValue::Time(_) => ValueKind::Time,
            SqlValue::Interval(_) => ValueKind::Interval,
            SqlValue::Uuid(_) => ValueKind::Uuid,
            SqlValue::SqlMap(_) => ValueKind::SqlMap,
            SqlValue::SqlList(_) => ValueKind::SqlList,
            SqlValue::SqlPoint(_) => ValueKind::SqlPoint,
            SqlValue::Null => ValueKind::Null,
        }
    }

    /// Returns the variant name.
    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Returns the boolean payload.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SqlValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns any fixed-width integer payload as `i64`.
    ///
    /// Widened unsigned variants are returned at full value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::I8(v) => Some(i64::from(*v)),
            SqlValue::I16(v) => Some(i64::from(*v)),
            SqlValue::I32(v) => Some(i64::from(*v)),
            SqlValue::I64(v) => Some(*v),
            SqlValue::U8(v) => Some(i64::from(v.get())),
            SqlValue::U16(v) => Some(i64::from(v.get())),
            SqlValue::U32(v) => Some(v.get()),
            _ => None,
        }
    }

    /// Returns any float payload as `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::F32(v) => Some(f64::from(*v)),
            SqlValue::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text of any string-backed variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Str(s) => Some(s),
            SqlValue::BigInt(v) => Some(v.as_str()),
            SqlValue::Inet(v) => Some(v.as_str()),
            SqlValue::Date(v) => Some(v.as_str()),
            SqlValue::Timestamp(v) => Some(v.as_str()),
            SqlValue::Time(v) => Some(v.as_str()),
            SqlValue::Interval(v) => Some(v.as_str()),
            SqlValue::Uuid(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Returns the byte payload.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            SqlValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the list payload.
    pub fn as_list(&self) -> Option<&[SqlValue]> {
        match self {
            SqlValue::SqlList(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the map payload.
    pub fn as_map(&self) -> Option<&HashMap<String, SqlValue>> {
        match self {
            SqlValue::SqlMap(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the point payload.
    pub fn as_point(&self) -> Option<Point> {
        match self {
            SqlValue::SqlPoint(p) => Some(*p),
            _ => None,
        }
    }

    /// Returns the nesting depth. Scalars have depth 0.
    pub fn depth(&self) -> usize {
        match self {
            SqlValue::SqlList(items) => 1 + items.iter().map(SqlValue::depth).max().unwrap_or(0),
            SqlValue::SqlMap(map) => 1 + map.values().map(SqlValue::depth).max().unwrap_or(0),
            _ => 0,
        }
    }

    /// Compares two values, allowing float leaves to differ by `epsilon`.
    pub fn approx_eq(&self, other: &SqlValue, epsilon: f64) -> bool {
        match (self, other) {
            (SqlValue::F32(a), SqlValue::F32(b)) => {
                (a.is_nan() && b.is_nan()) || f64::from((a - b).abs()) <= epsilon
            }
            (SqlValue::F64(a), SqlValue::F64(b)) => {
                (a.is_nan() && b.is_nan()) || (a - b).abs() <= epsilon
            }
            (SqlValue::SqlPoint(a), SqlValue::SqlPoint(b)) => {
                (a.x - b.x).abs() <= epsilon && (a.y - b.y).abs() <= epsilon
            }
            (SqlValue::SqlList(a), SqlValue::SqlList(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.approx_eq(y, epsilon))
            }
            (SqlValue::SqlMap(a), SqlValue::SqlMap(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|w| v.approx_eq(w, epsilon)))
            }
            _ => self == other,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            SqlValue::I8(v) => write!(f, "{}", v),
            SqlValue::I16(v) => write!(f, "{}", v),
            SqlValue::I32(v) => write!(f, "{}", v),
            SqlValue::I64(v) => write!(f, "{}", v),
            SqlValue::U8(v) => write!(f, "{}", v),
            SqlValue::U16(v) => write!(f, "{}", v),
            SqlValue::U32(v) => write!(f, "{}", v),
            SqlValue::F32(v) => write!(f, "{}", v),
            SqlValue::F64(v) => write!(f, "{}", v),
            SqlValue::BigInt(v) => write!(f, "{}", v),
            SqlValue::Str(s) => write!(f, "{}", s),
            SqlValue::Bytes(b) => write!(f, "\\x{}", hex::encode(b)),
            SqlValue::Inet(v) => write!(f, "{}", v),
            SqlValue::Date(v) => write!(f, "{}", v),
            SqlValue::Timestamp(v) => write!(f, "{}", v),
            SqlValue::Time(v) => write!(f, "{}", v),
            SqlValue::Interval(v) => write!(f, "{}", v),
            SqlValue::Uuid(v) => write!(f, "{}", v),
            SqlValue::SqlPoint(p) => write!(f, "{}", p),
            SqlValue::SqlList(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            SqlValue::SqlMap(map) => {
                // Sorted so output is stable.
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                write!(f, "{{")?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", key, map[key])?;
                }
                write!(f, "}}")
            }
            SqlValue::Null => write!(f, "NULL"),
        }
    }
}

/// The tag of a `SqlValue`, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// Boolean.
    Bool,
    /// 8-bit signed integer.
    I8,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// Widened 8-bit unsigned integer.
    U8,
    /// Widened 16-bit unsigned integer.
    U16,
    /// Widened 32-bit unsigned integer.
    U32,
    /// Single-precision float.
    F32,
    /// Double-precision float.
    F64,
    /// Arbitrary-precision integer.
    BigInt,
    /// Text.
    Str,
    /// Binary.
    Bytes,
    /// IP address.
    Inet,
    /// Date.
    Date,
    /// Timestamp.
    Timestamp,
    /// Time of day.
    Time,
    /// Interval.
    Interval,
    /// UUID.
    Uuid,
    /// Map.
    SqlMap,
    /// List.
    SqlList,
    /// Point.
    SqlPoint,
    /// NULL.
    Null,
}

impl ValueKind {
    /// Returns the variant name.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Bool => "Bool",
            ValueKind::I8 => "I8",
            ValueKind::I16 => "I16",
            ValueKind::I32 => "I32",
            ValueKind::I64 => "I64",
            ValueKind::U8 => "U8",
            ValueKind::U16 => "U16",
            ValueKind::U32 => "U32",
            ValueKind::F32 => "F32",
            ValueKind::F64 => "F64",
            ValueKind::BigInt => "BigInt",
            ValueKind::Str => "Str",
            ValueKind::Bytes => "Bytes",
            ValueKind::Inet => "Inet",
            ValueKind::Date => "Date",
            ValueKind::Timestamp => "Timestamp",
            ValueKind::Time => "Time",
            ValueKind::Interval => "Interval",
            ValueKind::Uuid => "Uuid",
            ValueKind::SqlMap => "SqlMap",
            ValueKind::SqlList => "SqlList",
            ValueKind::SqlPoint => "SqlPoint",
            ValueKind::Null => "Null",
        }
    }

    /// Returns true for `SqlList` and `SqlMap`.
    pub fn is_container(self) -> bool {
        matches!(self, ValueKind::SqlList | ValueKind::SqlMap)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Conversions from native types
// ============================================================================

macro_rules! from_native {
    ($($native:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$native> for SqlValue {
                fn from(v: $native) -> Self {
                    SqlValue::$variant(v.into())
                }
            }
        )*
    };
}

from_native! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    f32 => F32,
    f64 => F64,
    i128 => BigInt,
    u64 => BigInt,
    u128 => BigInt,
    String => Str,
    Vec<u8> => Bytes,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => Timestamp,
    IpAddr => Inet,
    uuid::Uuid => Uuid,
    Point => SqlPoint,
    Vec<SqlValue> => SqlList,
    HashMap<String, SqlValue> => SqlMap,
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Str(s.to_string())
    }
}

impl From<&[u8]> for SqlValue {
    fn from(b: &[u8]) -> Self {
        SqlValue::Bytes(b.to_vec())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}
