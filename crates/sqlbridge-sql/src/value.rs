//! Runtime values.
//!
//! `Value` is the engine's native representation. It keeps full-width
//! integers, chrono temporal types and raw 128-bit identifiers; conversion
//! into the boundary representation happens in the client.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{SqlError, SqlResult};
use crate::types::ColumnType;

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;
const MICROS_PER_DAY: i64 = 24 * MICROS_PER_HOUR;

/// A runtime value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// NULL.
    Null,
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
    /// 128-bit signed integer.
    I128(i128),
    /// 8-bit unsigned integer.
    U8(u8),
    /// 16-bit unsigned integer.
    U16(u16),
    /// 32-bit unsigned integer.
    U32(u32),
    /// 64-bit unsigned integer.
    U64(u64),
    /// 128-bit unsigned integer.
    U128(u128),
    /// Single-precision float.
    F32(#[serde(with = "crate::float::f32_repr")] f32),
    /// Double-precision float.
    F64(#[serde(with = "crate::float::f64_repr")] f64),
    /// Text.
    Str(String),
    /// Binary.
    Bytea(Vec<u8>),
    /// IP address.
    Inet(IpAddr),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time.
    Timestamp(NaiveDateTime),
    /// Time of day.
    Time(NaiveTime),
    /// Elapsed duration.
    Interval(Interval),
    /// 128-bit identifier.
    Uuid(u128),
    /// String-keyed map.
    Map(HashMap<String, Value>),
    /// Ordered list.
    List(Vec<Value>),
    /// Two-dimensional point.
    Point {
        /// X coordinate.
        #[serde(with = "crate::float::f64_repr")]
        x: f64,
        /// Y coordinate.
        #[serde(with = "crate::float::f64_repr")]
        y: f64,
    },
}

/// An elapsed duration.
///
/// Month-based and time-based intervals are kept apart since a month has
/// no fixed length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// Whole months.
    Month(i32),
    /// Microseconds.
    Microsecond(i64),
}

impl Interval {
    /// Parses a duration such as `1 year 2 months` or `3 days 4 hours`.
    pub fn parse(text: &str) -> SqlResult<Self> {
        let incompatible = || SqlError::Incompatible {
            value: format!("{:?}", text),
            target: "INTERVAL".to_string(),
        };

        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.is_empty() || tokens.len() % 2 != 0 {
            return Err(incompatible());
        }

        let overflow = || SqlError::Overflow("INTERVAL".to_string());

        let mut months: Option<i64> = None;
        let mut micros: Option<i64> = None;
        for pair in tokens.chunks(2) {
            let amount: f64 = pair[0].parse().map_err(|_| incompatible())?;
            if !amount.is_finite() {
                return Err(incompatible());
            }
            let unit = pair[1].to_ascii_lowercase();
            let unit = unit.trim_end_matches('s');
            let (slot, factor) = match unit {
                "year" | "month" => {
                    if amount.fract() != 0.0 {
                        return Err(incompatible());
                    }
                    (&mut months, if unit == "year" { 12 } else { 1 })
                }
                "day" => (&mut micros, MICROS_PER_DAY),
                "hour" => (&mut micros, MICROS_PER_HOUR),
                "minute" => (&mut micros, MICROS_PER_MINUTE),
                "second" => (&mut micros, MICROS_PER_SECOND),
                _ => return Err(incompatible()),
            };
            let scaled = (amount * factor as f64).round();
            // i64::MAX is not representable as f64; the bound is exclusive.
            if scaled.abs() >= i64::MAX as f64 {
                return Err(overflow());
            }
            let total = slot.unwrap_or(0).checked_add(scaled as i64).ok_or_else(overflow)?;
            *slot = Some(total);
        }

        match (months, micros) {
            (Some(m), None) => i32::try_from(m)
                .map(Interval::Month)
                .map_err(|_| overflow()),
            (None, Some(us)) => Ok(Interval::Microsecond(us)),
            _ => Err(SqlError::Unsupported(
                "interval mixing months with days or time".to_string(),
            )),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Interval::Month(total) => {
                let sign = if total < 0 { "-" } else { "" };
                let total = total.unsigned_abs();
                let (years, months) = (total / 12, total % 12);
                let plural = |n: u32| if n == 1 { "" } else { "s" };
                match (years, months) {
                    (0, m) => write!(f, "{}{} month{}", sign, m, plural(m)),
                    (y, 0) => write!(f, "{}{} year{}", sign, y, plural(y)),
                    (y, m) => write!(f, "{}{} year{} {} month{}", sign, y, plural(y), m, plural(m)),
                }
            }
            Interval::Microsecond(total) => {
                let sign = if total < 0 { "-" } else { "" };
                let total = total.unsigned_abs();
                let days = total / MICROS_PER_DAY as u64;
                let rest = total % MICROS_PER_DAY as u64;
                let hours = rest / MICROS_PER_HOUR as u64;
                let minutes = rest % MICROS_PER_HOUR as u64 / MICROS_PER_MINUTE as u64;
                let seconds = rest % MICROS_PER_MINUTE as u64 / MICROS_PER_SECOND as u64;
                let micros = rest % MICROS_PER_SECOND as u64;

                write!(f, "{}", sign)?;
                if days > 0 {
                    write!(f, "{} day{} ", days, if days == 1 { "" } else { "s" })?;
                }
                write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds)?;
                if micros > 0 {
                    write!(f, ".{:06}", micros)?;
                }
                Ok(())
            }
        }
    }
}

impl Value {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::I8(_) => "INT8",
            Value::I16(_) => "INT16",
            Value::I32(_) => "INT32",
            Value::I64(_) => "INT64",
            Value::I128(_) => "INT128",
            Value::U8(_) => "UINT8",
            Value::U16(_) => "UINT16",
            Value::U32(_) => "UINT32",
            Value::U64(_) => "UINT64",
            Value::U128(_) => "UINT128",
            Value::F32(_) => "FLOAT32",
            Value::F64(_) => "FLOAT64",
            Value::Str(_) => "TEXT",
            Value::Bytea(_) => "BYTEA",
            Value::Inet(_) => "INET",
            Value::Date(_) => "DATE",
            Value::Timestamp(_) => "TIMESTAMP",
            Value::Time(_) => "TIME",
            Value::Interval(_) => "INTERVAL",
            Value::Uuid(_) => "UUID",
            Value::Map(_) => "MAP",
            Value::List(_) => "LIST",
            Value::Point { .. } => "POINT",
        }
    }

    /// Returns the value as `i128` if it is an integer that fits.
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Value::I8(v) => Some(v.into()),
            Value::I16(v) => Some(v.into()),
            Value::I32(v) => Some(v.into()),
            Value::I64(v) => Some(v.into()),
            Value::I128(v) => Some(v),
            Value::U8(v) => Some(v.into()),
            Value::U16(v) => Some(v.into()),
            Value::U32(v) => Some(v.into()),
            Value::U64(v) => Some(v.into()),
            Value::U128(v) => i128::try_from(v).ok(),
            _ => None,
        }
    }

    /// Returns the value as `f64` if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F32(v) => Some(v.into()),
            Value::F64(v) => Some(v),
            Value::U128(v) => Some(v as f64),
            _ => self.as_i128().map(|v| v as f64),
        }
    }

    /// Returns the column type of an integer value.
    pub fn integer_type(&self) -> Option<ColumnType> {
        let ty = match self {
            Value::I8(_) => ColumnType::Int8,
            Value::I16(_) => ColumnType::Int16,
            Value::I32(_) => ColumnType::Int32,
            Value::I64(_) => ColumnType::Int64,
            Value::I128(_) => ColumnType::Int128,
            Value::U8(_) => ColumnType::Uint8,
            Value::U16(_) => ColumnType::Uint16,
            Value::U32(_) => ColumnType::Uint32,
            Value::U64(_) => ColumnType::Uint64,
            Value::U128(_) => ColumnType::Uint128,
            _ => return None,
        };
        Some(ty)
    }

    pub(crate) fn is_integer(&self) -> bool {
        matches!(
            self,
            Value::I8(_)
                | Value::I16(_)
                | Value::I32(_)
                | Value::I64(_)
                | Value::I128(_)
                | Value::U8(_)
                | Value::U16(_)
                | Value::U32(_)
                | Value::U64(_)
                | Value::U128(_)
        )
    }

    pub(crate) fn is_float(&self) -> bool {
        matches!(self, Value::F32(_) | Value::F64(_))
    }

    /// Parses a numeric literal into the narrowest fitting default type.
    pub fn parse_number(text: &str) -> SqlResult<Value> {
        let incompatible = || SqlError::Incompatible {
            value: text.to_string(),
            target: "number".to_string(),
        };

        if text.contains(['.', 'e', 'E']) {
            return text.parse::<f64>().map(Value::F64).map_err(|_| incompatible());
        }
        if let Ok(v) = text.parse::<i64>() {
            return Ok(Value::I64(v));
        }
        if let Ok(v) = text.parse::<i128>() {
            return Ok(Value::I128(v));
        }
        if let Ok(v) = text.parse::<u128>() {
            return Ok(Value::U128(v));
        }
        Err(incompatible())
    }

    /// Three-valued truthiness: `None` for NULL.
    pub fn truthy(&self) -> SqlResult<Option<bool>> {
        match self {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(*b)),
            other => Err(SqlError::Incompatible {
                value: other.to_string(),
                target: "BOOLEAN".to_string(),
            }),
        }
    }

    /// Compares two values. Returns `None` when either side is NULL or the
    /// types are not comparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => None,
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (a, b) if a.is_integer() && b.is_integer() => match (a.as_i128(), b.as_i128()) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
            },
            (a, b) if (a.is_integer() || a.is_float()) && (b.is_integer() || b.is_float()) => {
                a.as_f64()?.partial_cmp(&b.as_f64()?)
            }
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Bytea(a), Value::Bytea(b)) => Some(a.cmp(b)),
            (Value::Inet(a), Value::Inet(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Timestamp(b)) => a.and_time(NaiveTime::MIN).partial_cmp(b),
            (Value::Timestamp(a), Value::Date(b)) => a.partial_cmp(&b.and_time(NaiveTime::MIN)),
            (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
            (Value::Interval(Interval::Month(a)), Value::Interval(Interval::Month(b))) => {
                Some(a.cmp(b))
            }
            (
                Value::Interval(Interval::Microsecond(a)),
                Value::Interval(Interval::Microsecond(b)),
            ) => Some(a.cmp(b)),
            (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
            (Value::Point { x: ax, y: ay }, Value::Point { x: bx, y: by }) => {
                if ax == bx && ay == by {
                    Some(Ordering::Equal)
                } else {
                    None
                }
            }
            (Value::List(a), Value::List(b)) if a == b => Some(Ordering::Equal),
            (Value::Map(a), Value::Map(b)) if a == b => Some(Ordering::Equal),
            _ => None,
        }
    }

    /// Total ordering for ORDER BY: NULLs sort last, incomparable values
    /// compare equal.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.compare(other).unwrap_or(Ordering::Equal),
        }
    }

    /// Converts a JSON document into a value. Used for MAP and LIST input.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    Value::I64(v)
                } else if let Some(v) = n.as_u64() {
                    Value::U64(v)
                } else {
                    Value::F64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Coerces the value into the given column type.
    pub fn coerce(self, target: ColumnType) -> SqlResult<Value> {
        if self.is_null() {
            return Ok(Value::Null);
        }

        let incompatible = |value: &Value| SqlError::Incompatible {
            value: value.to_string(),
            target: target.sql_name().to_string(),
        };

        if target.is_integer() {
            if let Some(v) = self.as_i128() {
                return integer_to(v, target).ok_or_else(|| incompatible(&self));
            }
            if let Value::U128(v) = self {
                return match target {
                    ColumnType::Uint128 => Ok(Value::U128(v)),
                    _ => Err(incompatible(&self)),
                };
            }
            if let Some(f) = self.as_f64().filter(|_| self.is_float()) {
                if f.fract() == 0.0 && f.is_finite() {
                    return integer_to(f as i128, target).ok_or_else(|| incompatible(&self));
                }
                return Err(incompatible(&self));
            }
            if let Value::Str(s) = &self {
                let parsed = Value::parse_number(s.trim()).map_err(|_| incompatible(&self))?;
                return parsed.coerce(target);
            }
            return Err(incompatible(&self));
        }

        match (target, self) {
            (ColumnType::Boolean, v @ Value::Bool(_)) => Ok(v),
            (ColumnType::Boolean, Value::Str(s)) => match s.to_ascii_uppercase().as_str() {
                "TRUE" => Ok(Value::Bool(true)),
                "FALSE" => Ok(Value::Bool(false)),
                _ => Err(incompatible(&Value::Str(s))),
            },
            (ColumnType::Float32, v) if v.is_float() || v.is_integer() => {
                Ok(Value::F32(v.as_f64().unwrap_or_default() as f32))
            }
            (ColumnType::Float64, v) if v.is_float() || v.is_integer() => {
                Ok(Value::F64(v.as_f64().unwrap_or_default()))
            }
            (ColumnType::Float32 | ColumnType::Float64, Value::Str(s)) => {
                match s.trim().parse::<f64>() {
                    Ok(f) if target == ColumnType::Float32 => Ok(Value::F32(f as f32)),
                    Ok(f) => Ok(Value::F64(f)),
                    Err(_) => Err(incompatible(&Value::Str(s))),
                }
            }
            (ColumnType::Text, Value::Str(s)) => Ok(Value::Str(s)),
            (ColumnType::Text, v) => Ok(Value::Str(v.to_string())),
            (ColumnType::Bytea, v @ Value::Bytea(_)) => Ok(v),
            (ColumnType::Bytea, Value::Str(s)) => hex::decode(&s)
                .map(Value::Bytea)
                .map_err(|_| incompatible(&Value::Str(s))),
            (ColumnType::Inet, v @ Value::Inet(_)) => Ok(v),
            (ColumnType::Inet, Value::Str(s)) => s
                .trim()
                .parse()
                .map(Value::Inet)
                .map_err(|_| incompatible(&Value::Str(s))),
            (ColumnType::Date, v @ Value::Date(_)) => Ok(v),
            (ColumnType::Date, Value::Timestamp(ts)) => Ok(Value::Date(ts.date())),
            (ColumnType::Date, Value::Str(s)) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| incompatible(&Value::Str(s))),
            (ColumnType::Time, v @ Value::Time(_)) => Ok(v),
            (ColumnType::Time, Value::Timestamp(ts)) => Ok(Value::Time(ts.time())),
            (ColumnType::Time, Value::Str(s)) => NaiveTime::parse_from_str(s.trim(), "%H:%M:%S%.f")
                .map(Value::Time)
                .map_err(|_| incompatible(&Value::Str(s))),
            (ColumnType::Timestamp, v @ Value::Timestamp(_)) => Ok(v),
            (ColumnType::Timestamp, Value::Date(d)) => Ok(Value::Timestamp(d.and_time(NaiveTime::MIN))),
            (ColumnType::Timestamp, Value::Str(s)) => parse_timestamp(s.trim())
                .map(Value::Timestamp)
                .ok_or_else(|| incompatible(&Value::Str(s))),
            (ColumnType::Interval, v @ Value::Interval(_)) => Ok(v),
            (ColumnType::Interval, Value::Str(s)) => Interval::parse(&s).map(Value::Interval),
            (ColumnType::Uuid, v @ Value::Uuid(_)) => Ok(v),
            (ColumnType::Uuid, Value::Str(s)) => uuid::Uuid::try_parse(s.trim())
                .map(|u| Value::Uuid(u.as_u128()))
                .map_err(|_| incompatible(&Value::Str(s))),
            (ColumnType::Map, v @ Value::Map(_)) => Ok(v),
            (ColumnType::Map, Value::Str(s)) => match serde_json::from_str(&s) {
                Ok(json @ serde_json::Value::Object(_)) => Ok(Value::from_json(json)),
                _ => Err(incompatible(&Value::Str(s))),
            },
            (ColumnType::List, v @ Value::List(_)) => Ok(v),
            (ColumnType::List, Value::Str(s)) => match serde_json::from_str(&s) {
                Ok(json @ serde_json::Value::Array(_)) => Ok(Value::from_json(json)),
                _ => Err(incompatible(&Value::Str(s))),
            },
            (ColumnType::Point, v @ Value::Point { .. }) => Ok(v),
            (ColumnType::Point, Value::Str(s)) => {
                parse_point(&s).ok_or_else(|| incompatible(&Value::Str(s)))
            }
            (_, v) => Err(incompatible(&v)),
        }
    }
}

pub(crate) fn integer_to(v: i128, target: ColumnType) -> Option<Value> {
    let value = match target {
        ColumnType::Int8 => Value::I8(i8::try_from(v).ok()?),
        ColumnType::Int16 => Value::I16(i16::try_from(v).ok()?),
        ColumnType::Int32 => Value::I32(i32::try_from(v).ok()?),
        ColumnType::Int64 => Value::I64(i64::try_from(v).ok()?),
        ColumnType::Int128 => Value::I128(v),
        ColumnType::Uint8 => Value::U8(u8::try_from(v).ok()?),
        ColumnType::Uint16 => Value::U16(u16::try_from(v).ok()?),
        ColumnType::Uint32 => Value::U32(u32::try_from(v).ok()?),
        ColumnType::Uint64 => Value::U64(u64::try_from(v).ok()?),
        ColumnType::Uint128 => Value::U128(u128::try_from(v).ok()?),
        _ => return None,
    };
    Some(value)
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

fn parse_point(text: &str) -> Option<Value> {
    let upper = text.trim().to_ascii_uppercase();
    let inner = upper.strip_prefix("POINT")?.trim();
    let inner = inner.strip_prefix('(')?.strip_suffix(')')?;
    let mut parts = inner.split_whitespace();
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Value::Point { x, y })
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::I8(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::I128(v) => write!(f, "{}", v),
            Value::U8(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::U128(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "'{}'", s),
            Value::Bytea(b) => write!(f, "X'{}'", hex::encode(b)),
            Value::Inet(ip) => write!(f, "{}", ip),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f")),
            Value::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            Value::Interval(i) => write!(f, "{}", i),
            Value::Uuid(u) => write!(f, "{}", uuid::Uuid::from_u128(*u).hyphenated()),
            Value::Map(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                let entries: Vec<String> =
                    keys.into_iter().map(|k| format!("{:?}: {}", k, map[k])).collect();
                write!(f, "{{{}}}", entries.join(", "))
            }
            Value::List(items) => {
                let items: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Point { x, y } => write!(f, "POINT({} {})", x, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_widths() {
        assert_eq!(Value::parse_number("42").unwrap(), Value::I64(42));
        assert_eq!(Value::parse_number("2.5").unwrap(), Value::F64(2.5));
        assert_eq!(
            Value::parse_number("123456789012345678901234567890").unwrap(),
            Value::I128(123456789012345678901234567890)
        );
        assert_eq!(
            Value::parse_number(&u128::MAX.to_string()).unwrap(),
            Value::U128(u128::MAX)
        );
        assert!(Value::parse_number("12abc").is_err());
    }

    #[test]
    fn test_coerce_integers() {
        assert_eq!(Value::I64(255).coerce(ColumnType::Uint8).unwrap(), Value::U8(255));
        assert!(Value::I64(256).coerce(ColumnType::Uint8).is_err());
        assert!(Value::I64(-1).coerce(ColumnType::Uint32).is_err());
        assert_eq!(Value::F64(3.0).coerce(ColumnType::Int32).unwrap(), Value::I32(3));
        assert!(Value::F64(3.5).coerce(ColumnType::Int32).is_err());
        assert_eq!(Value::Str("17".into()).coerce(ColumnType::Int16).unwrap(), Value::I16(17));
        assert_eq!(Value::Null.coerce(ColumnType::Int8).unwrap(), Value::Null);
    }

    #[test]
    fn test_coerce_strings() {
        let date = Value::Str("2024-10-08".into()).coerce(ColumnType::Date).unwrap();
        assert_eq!(date, Value::Date(NaiveDate::from_ymd_opt(2024, 10, 8).unwrap()));

        let uuid = Value::Str("550e8400-e29b-41d4-a716-446655440000".into())
            .coerce(ColumnType::Uuid)
            .unwrap();
        assert_eq!(uuid, Value::Uuid(0x550e8400_e29b_41d4_a716_446655440000));

        let map = Value::Str(r#"{"a": [1, "x"]}"#.into()).coerce(ColumnType::Map).unwrap();
        match map {
            Value::Map(m) => assert_eq!(
                m["a"],
                Value::List(vec![Value::I64(1), Value::Str("x".into())])
            ),
            other => panic!("unexpected {other:?}"),
        }
        assert!(Value::Str("[1]".into()).coerce(ColumnType::Map).is_err());

        let point = Value::Str("POINT(1.5 -2)".into()).coerce(ColumnType::Point).unwrap();
        assert_eq!(point, Value::Point { x: 1.5, y: -2.0 });

        assert_eq!(
            Value::Str("cafe".into()).coerce(ColumnType::Bytea).unwrap(),
            Value::Bytea(vec![0xca, 0xfe])
        );
        assert!(Value::Str("nope".into()).coerce(ColumnType::Inet).is_err());
    }

    #[test]
    fn test_interval_parse_and_display() {
        let months = Interval::parse("1 year 2 months").unwrap();
        assert_eq!(months, Interval::Month(14));
        assert_eq!(months.to_string(), "1 year 2 months");

        let micros = Interval::parse("3 days 4 hours 5 minutes 6 seconds").unwrap();
        assert_eq!(micros.to_string(), "3 days 04:05:06");
        assert_eq!(Interval::Microsecond(-1_500_000).to_string(), "-00:00:01.500000");

        assert!(Interval::parse("1 year 1 day").is_err());
        assert!(Interval::parse("fortnight").is_err());
    }

    #[test]
    fn test_interval_parse_rejects_out_of_range() {
        for text in ["1e30 years", "1e18 days", "9223372036854775807 months"] {
            assert!(
                matches!(Interval::parse(text), Err(SqlError::Overflow(_))),
                "{text}"
            );
        }
        assert!(matches!(
            Interval::parse("2147483647 years"),
            Err(SqlError::Overflow(_))
        ));
        assert!(matches!(
            Interval::parse(&"5000000 days ".repeat(22)),
            Err(SqlError::Overflow(_))
        ));
        assert!(Interval::parse("inf days").is_err());
        assert!(Interval::parse("NaN hours").is_err());
    }

    #[test]
    fn test_compare_across_numeric_types() {
        assert_eq!(Value::I8(3).compare(&Value::U64(3)), Some(Ordering::Equal));
        assert_eq!(Value::I32(2).compare(&Value::F64(2.5)), Some(Ordering::Less));
        assert_eq!(Value::Null.compare(&Value::I32(1)), None);
        assert_eq!(Value::Str("a".into()).compare(&Value::I32(1)), None);
        assert_eq!(Value::Null.sort_cmp(&Value::I32(1)), Ordering::Greater);
    }
}
