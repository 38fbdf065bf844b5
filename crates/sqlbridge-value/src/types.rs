//! Validated payload types.
//!
//! Variants whose host representation is narrower or looser than the value
//! they carry hold one of these newtypes. Fields are private, so the only
//! way to obtain one is through a checked constructor:
//!
//! - `WideU8`, `WideU16`, `WideU32` keep an unsigned integer in the next
//!   larger signed slot.
//! - `BigInt` keeps an arbitrary-precision integer as a decimal string.
//! - `Date`, `Time`, `Timestamp`, `Interval`, `Inet` and `Uuid` keep
//!   canonical text forms.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{ValueError, ValueResult};
use crate::value::ValueKind;

/// Format used for `Date` payloads.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Format used when rendering `Time` payloads.
pub const TIME_FORMAT: &str = "%H:%M:%S%.3f";
/// Format used when rendering `Timestamp` payloads.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

const TIME_PARSE_FORMAT: &str = "%H:%M:%S%.f";
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

// ============================================================================
// Widened unsigned integers
// ============================================================================

macro_rules! widened_unsigned {
    ($(#[$meta:meta])* $name:ident, $unsigned:ty, $slot:ty, $slot_name:literal, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = $slot_name, into = $slot_name)]
        pub struct $name($slot);

        impl $name {
            /// Widens an unsigned value. Never fails.
            pub const fn new(value: $unsigned) -> Self {
                Self(value as $slot)
            }

            /// Returns the widened signed representation.
            pub const fn get(self) -> $slot {
                self.0
            }

            /// Narrows back to the native unsigned width.
            pub const fn to_unsigned(self) -> $unsigned {
                self.0 as $unsigned
            }
        }

        impl TryFrom<$slot> for $name {
            type Error = ValueError;

            fn try_from(value: $slot) -> ValueResult<Self> {
                if value < 0 || value > <$unsigned>::MAX as $slot {
                    return Err(ValueError::invalid(
                        $kind,
                        value.to_string(),
                        format!("outside 0..={}", <$unsigned>::MAX),
                    ));
                }
                Ok(Self(value))
            }
        }

        impl From<$unsigned> for $name {
            fn from(value: $unsigned) -> Self {
                Self::new(value)
            }
        }

        impl From<$name> for $slot {
            fn from(value: $name) -> $slot {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

widened_unsigned!(
    /// An 8-bit unsigned integer held in a 16-bit signed slot.
    WideU8, u8, i16, "i16", ValueKind::U8
);
widened_unsigned!(
    /// A 16-bit unsigned integer held in a 32-bit signed slot.
    WideU16, u16, i32, "i32", ValueKind::U16
);
widened_unsigned!(
    /// A 32-bit unsigned integer held in a 64-bit signed slot.
    WideU32, u32, i64, "i64", ValueKind::U32
);

// ============================================================================
// Text-backed payloads
// ============================================================================

macro_rules! text_payload {
    ($(#[$meta:meta])* $name:ident, $validate:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validates and wraps the given text.
            pub fn new(text: impl Into<String>) -> ValueResult<Self> {
                let text = text.into();
                $validate(&text)?;
                Ok(Self(text))
            }

            /// Returns the payload text.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the payload, returning the text.
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueError;

            fn try_from(text: String) -> ValueResult<Self> {
                Self::new(text)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ValueError;

            fn try_from(text: &str) -> ValueResult<Self> {
                Self::new(text)
            }
        }

        impl FromStr for $name {
            type Err = ValueError;

            fn from_str(text: &str) -> ValueResult<Self> {
                Self::new(text)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

text_payload!(
    /// An arbitrary-precision integer in decimal form.
    ///
    /// Accepts an optional `+` or `-` sign followed by one or more ASCII
    /// digits. The text is stored exactly as given.
    BigInt,
    validate_bigint
);

text_payload!(
    /// A calendar date, `YYYY-MM-DD`.
    Date,
    validate_date
);

text_payload!(
    /// A time of day without timezone, `HH:MM:SS[.fff]`.
    Time,
    validate_time
);

text_payload!(
    /// A date and time without timezone, `YYYY-MM-DD HH:MM:SS[.fff]`.
    Timestamp,
    validate_timestamp
);

text_payload!(
    /// An elapsed duration in human-readable form.
    ///
    /// The text is opaque to the value layer; only emptiness is rejected.
    Interval,
    validate_interval
);

text_payload!(
    /// An IPv4 or IPv6 address in textual form.
    Inet,
    validate_inet
);

text_payload!(
    /// A 128-bit identifier in hyphenated `8-4-4-4-12` form.
    Uuid,
    validate_uuid
);

fn validate_bigint(text: &str) -> ValueResult<()> {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    if digits.is_empty() {
        return Err(ValueError::invalid(ValueKind::BigInt, text, "no digits"));
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValueError::invalid(
            ValueKind::BigInt,
            text,
            "expected an optional sign followed by decimal digits",
        ));
    }
    Ok(())
}

fn validate_date(text: &str) -> ValueResult<()> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map(|_| ())
        .map_err(|e| ValueError::invalid(ValueKind::Date, text, e.to_string()))
}

fn validate_time(text: &str) -> ValueResult<()> {
    NaiveTime::parse_from_str(text, TIME_PARSE_FORMAT)
        .map(|_| ())
        .map_err(|e| ValueError::invalid(ValueKind::Time, text, e.to_string()))
}

fn validate_timestamp(text: &str) -> ValueResult<()> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_PARSE_FORMAT)
        .map(|_| ())
        .map_err(|e| ValueError::invalid(ValueKind::Timestamp, text, e.to_string()))
}

fn validate_interval(text: &str) -> ValueResult<()> {
    if text.trim().is_empty() {
        return Err(ValueError::invalid(ValueKind::Interval, text, "empty interval"));
    }
    Ok(())
}

fn validate_inet(text: &str) -> ValueResult<()> {
    text.parse::<IpAddr>()
        .map(|_| ())
        .map_err(|e| ValueError::invalid(ValueKind::Inet, text, e.to_string()))
}

fn validate_uuid(text: &str) -> ValueResult<()> {
    // uuid accepts simple, braced and urn forms too; only the hyphenated one is canonical.
    let hyphenated = text.len() == 36
        && text
            .char_indices()
            .all(|(i, c)| matches!(i, 8 | 13 | 18 | 23) == (c == '-'));
    if !hyphenated {
        return Err(ValueError::invalid(
            ValueKind::Uuid,
            text,
            "expected hyphenated 8-4-4-4-12 form",
        ));
    }
    uuid::Uuid::try_parse(text)
        .map(|_| ())
        .map_err(|e| ValueError::invalid(ValueKind::Uuid, text, e.to_string()))
}

impl BigInt {
    /// Returns the value as `i128` if it fits.
    pub fn to_i128(&self) -> Option<i128> {
        self.0.parse().ok()
    }

    /// Returns true if the value is negative.
    pub fn is_negative(&self) -> bool {
        self.0.starts_with('-') && self.0[1..].bytes().any(|b| b != b'0')
    }
}

macro_rules! bigint_from {
    ($($native:ty),*) => {
        $(
            impl From<$native> for BigInt {
                fn from(value: $native) -> Self {
                    BigInt(value.to_string())
                }
            }
        )*
    };
}

bigint_from!(i64, i128, u64, u128);

impl Date {
    /// Parses the payload as a `NaiveDate`.
    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.0, DATE_FORMAT).ok()
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date.format(DATE_FORMAT).to_string())
    }
}

impl Time {
    /// Parses the payload as a `NaiveTime`.
    pub fn to_naive(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(&self.0, TIME_PARSE_FORMAT).ok()
    }
}

impl From<NaiveTime> for Time {
    fn from(time: NaiveTime) -> Self {
        Time(time.format(TIME_FORMAT).to_string())
    }
}

impl Timestamp {
    /// Parses the payload as a `NaiveDateTime`.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.0, TIMESTAMP_PARSE_FORMAT).ok()
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(ts: NaiveDateTime) -> Self {
        Timestamp(ts.format(TIMESTAMP_FORMAT).to_string())
    }
}

impl Inet {
    /// Parses the payload as an `IpAddr`.
    pub fn to_ip(&self) -> Option<IpAddr> {
        self.0.parse().ok()
    }
}

impl From<IpAddr> for Inet {
    fn from(addr: IpAddr) -> Self {
        Inet(addr.to_string())
    }
}

impl Uuid {
    /// Returns the identifier as a `u128`.
    pub fn to_u128(&self) -> u128 {
        uuid::Uuid::try_parse(&self.0)
            .map(|u| u.as_u128())
            .unwrap_or_default()
    }
}

impl From<uuid::Uuid> for Uuid {
    fn from(id: uuid::Uuid) -> Self {
        Uuid(id.hyphenated().to_string())
    }
}

// ============================================================================
// Point
// ============================================================================

/// A two-dimensional point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    #[serde(with = "crate::wire::float64")]
    pub x: f64,
    /// Y coordinate.
    #[serde(with = "crate::wire::float64")]
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "POINT({} {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widened_unsigned_bounds() {
        assert_eq!(WideU8::new(255).get(), 255i16);
        assert_eq!(WideU16::new(65535).get(), 65535i32);
        assert_eq!(WideU32::new(4_294_967_295).get(), 4_294_967_295i64);

        assert!(WideU8::try_from(256i16).is_err());
        assert!(WideU8::try_from(-1i16).is_err());
        assert!(WideU16::try_from(65536i32).is_err());
        assert!(WideU32::try_from(-5i64).is_err());
        assert_eq!(WideU32::try_from(7i64).unwrap().to_unsigned(), 7u32);
    }

    #[test]
    fn test_bigint_validation() {
        let big = BigInt::new("123456789012345678901234567890").unwrap();
        assert_eq!(big.as_str(), "123456789012345678901234567890");
        assert!(BigInt::new("-42").is_ok());
        assert!(BigInt::new("+42").is_ok());

        for bad in ["", "-", "12a", "1.5", " 1", "1e9"] {
            let err = BigInt::new(bad).unwrap_err();
            assert_eq!(err.kind(), Some(ValueKind::BigInt), "{bad:?}");
        }
    }

    #[test]
    fn test_bigint_from_native() {
        assert_eq!(BigInt::from(u128::MAX).as_str(), u128::MAX.to_string());
        assert_eq!(BigInt::from(i128::MIN).to_i128(), Some(i128::MIN));
        assert!(BigInt::from(-3i64).is_negative());
        assert!(!BigInt::new("-000").unwrap().is_negative());
        assert_eq!(BigInt::new("99999999999999999999999999999999999999999").unwrap().to_i128(), None);
    }

    #[test]
    fn test_temporal_validation() {
        assert!(Date::new("2024-10-08").is_ok());
        assert!(Date::new("2024-02-30").is_err());
        assert!(Date::new("08/10/2024").is_err());

        assert!(Time::new("12:00:00.000").is_ok());
        assert!(Time::new("23:59:59").is_ok());
        assert!(Time::new("24:00:01").is_err());

        assert!(Timestamp::new("2024-10-08 15:30:45.123").is_ok());
        assert!(Timestamp::new("2024-10-08T15:30:45").is_err());
    }

    #[test]
    fn test_temporal_from_chrono() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 8).unwrap();
        assert_eq!(Date::from(date).as_str(), "2024-10-08");

        let time = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        assert_eq!(Time::from(time).as_str(), "12:00:00.000");

        let ts = date.and_hms_milli_opt(15, 30, 45, 123).unwrap();
        let stamp = Timestamp::from(ts);
        assert_eq!(stamp.as_str(), "2024-10-08 15:30:45.123");
        assert_eq!(stamp.to_naive(), Some(ts));
    }

    #[test]
    fn test_inet_validation() {
        assert!(Inet::new("192.168.1.1").is_ok());
        assert!(Inet::new("::1").is_ok());
        assert!(Inet::new("2001:db8::ff00:42:8329").is_ok());
        assert!(Inet::new("300.1.1.1").is_err());
        assert!(Inet::new("localhost").is_err());
    }

    #[test]
    fn test_uuid_validation() {
        let id = Uuid::new("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(id.to_u128(), 0x550e8400_e29b_41d4_a716_446655440000);
        assert_eq!(Uuid::from(uuid::Uuid::from_u128(id.to_u128())), id);

        assert!(Uuid::new("550e8400e29b41d4a716446655440000").is_err());
        assert!(Uuid::new("{550e8400-e29b-41d4-a716-446655440000}").is_err());
        assert!(Uuid::new("550e8400-e29b-41d4-a716-44665544000g").is_err());
    }

    #[test]
    fn test_interval_validation() {
        assert!(Interval::new("1 year 2 months").is_ok());
        assert!(Interval::new("   ").is_err());
    }

    #[test]
    fn test_point_display() {
        assert_eq!(Point::new(1.5, -2.0).to_string(), "POINT(1.5 -2)");
    }
}
