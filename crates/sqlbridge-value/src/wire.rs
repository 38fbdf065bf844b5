//! JSON wire codec for `SqlValue`.
//!
//! Values are encoded as `{"type": "<Variant>", "value": <payload>}`.
//! String-backed payloads are re-validated on decode, so a malformed
//! document fails instead of producing a value that breaks its contract.
//! Non-finite floats travel as the strings `"NaN"`, `"inf"` and `"-inf"`.

use serde::{Deserialize, Deserializer, Serializer};

use crate::error::ValueResult;
use crate::value::SqlValue;

/// Encodes a value as a JSON string.
pub fn encode(value: &SqlValue) -> ValueResult<String> {
    Ok(serde_json::to_string(value)?)
}

/// Encodes a value as JSON bytes.
pub fn encode_to_vec(value: &SqlValue) -> ValueResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Decodes a value from a JSON string.
pub fn decode(text: &str) -> ValueResult<SqlValue> {
    Ok(serde_json::from_str(text)?)
}

/// Decodes a value from JSON bytes.
pub fn decode_from_slice(bytes: &[u8]) -> ValueResult<SqlValue> {
    Ok(serde_json::from_slice(bytes)?)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FloatRepr {
    Number(f64),
    Text(String),
}

impl FloatRepr {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            FloatRepr::Number(v) => Ok(v),
            FloatRepr::Text(text) => match text.as_str() {
                "NaN" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(E::custom(format!("invalid float literal {other:?}"))),
            },
        }
    }
}

fn non_finite_name(nan: bool, positive: bool) -> &'static str {
    match (nan, positive) {
        (true, _) => "NaN",
        (false, true) => "inf",
        (false, false) => "-inf",
    }
}

pub(crate) mod float32 {
    use super::*;

    pub fn serialize<S: Serializer>(v: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        if v.is_finite() {
            serializer.serialize_f32(*v)
        } else {
            serializer.serialize_str(non_finite_name(v.is_nan(), v.is_sign_positive()))
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        FloatRepr::deserialize(deserializer)?
            .into_f64()
            .map(|v| v as f32)
    }
}

pub(crate) mod float64 {
    use super::*;

    pub fn serialize<S: Serializer>(v: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if v.is_finite() {
            serializer.serialize_f64(*v)
        } else {
            serializer.serialize_str(non_finite_name(v.is_nan(), v.is_sign_positive()))
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        FloatRepr::deserialize(deserializer)?.into_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Point, WideU8};
    use crate::ValueError;

    fn sample_values() -> Vec<SqlValue> {
        vec![
            SqlValue::Bool(true),
            SqlValue::I8(i8::MIN),
            SqlValue::I16(i16::MAX),
            SqlValue::I32(-123_456),
            SqlValue::I64(i64::MIN),
            SqlValue::from(255u8),
            SqlValue::from(65535u16),
            SqlValue::from(u32::MAX),
            SqlValue::F32(3.14159),
            SqlValue::F64(-2.718281828459045),
            SqlValue::big_int("123456789012345678901234567890").unwrap(),
            SqlValue::from("héllo, 世界 🌍"),
            SqlValue::Bytes(vec![0, 1, 2, 254, 255]),
            SqlValue::inet("::1").unwrap(),
            SqlValue::date("2024-10-08").unwrap(),
            SqlValue::timestamp("2024-10-08 15:30:45.123").unwrap(),
            SqlValue::time("12:00:00.000").unwrap(),
            SqlValue::interval("1 year 2 months").unwrap(),
            SqlValue::uuid("550e8400-e29b-41d4-a716-446655440000").unwrap(),
            SqlValue::SqlPoint(Point::new(1.5, -0.25)),
            SqlValue::list(vec![SqlValue::from(1i64), SqlValue::from("two"), SqlValue::Null]),
            SqlValue::try_map_from_pairs([
                ("k", SqlValue::from(1i32)),
                ("nested", SqlValue::list(vec![SqlValue::Bool(false)])),
            ])
            .unwrap(),
            SqlValue::Null,
        ]
    }

    #[test]
    fn test_every_variant_round_trips() {
        for value in sample_values() {
            let encoded = encode(&value).unwrap();
            let decoded = decode(&encoded).unwrap();
            assert_eq!(decoded, value, "round trip of {encoded}");
            assert_eq!(decoded.kind(), value.kind());
        }
    }

    #[test]
    fn test_float_bits_preserved() {
        for v in [0.1f64, -0.0, f64::MIN_POSITIVE, f64::MAX, 1e-300] {
            let decoded = decode(&encode(&SqlValue::F64(v)).unwrap()).unwrap();
            assert_eq!(decoded.as_f64().map(f64::to_bits), Some(v.to_bits()));
        }
        for v in [0.1f32, -1.5, f32::MAX, f32::EPSILON] {
            match decode(&encode(&SqlValue::F32(v)).unwrap()).unwrap() {
                SqlValue::F32(d) => assert_eq!(d.to_bits(), v.to_bits()),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_random_float_bit_patterns_round_trip() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..20_000 {
            let v = f64::from_bits(rng.gen::<u64>());
            if !v.is_finite() {
                continue;
            }
            let decoded = decode(&encode(&SqlValue::F64(v)).unwrap()).unwrap();
            assert_eq!(decoded.as_f64().map(f64::to_bits), Some(v.to_bits()), "{v:e}");

            let point = SqlValue::SqlPoint(Point::new(v, -v));
            assert_eq!(decode(&encode(&point).unwrap()).unwrap(), point);

            let w = f32::from_bits(rng.gen::<u32>());
            if w.is_finite() {
                match decode(&encode(&SqlValue::F32(w)).unwrap()).unwrap() {
                    SqlValue::F32(d) => assert_eq!(d.to_bits(), w.to_bits(), "{w:e}"),
                    other => panic!("unexpected {other:?}"),
                }
            }
        }
    }

    #[test]
    fn test_non_finite_point_round_trips() {
        let point = SqlValue::point(f64::INFINITY, f64::NEG_INFINITY);
        assert_eq!(decode(&encode(&point).unwrap()).unwrap(), point);
    }

    #[test]
    fn test_non_finite_floats() {
        let encoded = encode(&SqlValue::F64(f64::INFINITY)).unwrap();
        assert_eq!(encoded, r#"{"type":"F64","value":"inf"}"#);
        assert_eq!(decode(&encoded).unwrap(), SqlValue::F64(f64::INFINITY));

        match decode(&encode(&SqlValue::F32(f32::NAN)).unwrap()).unwrap() {
            SqlValue::F32(v) => assert!(v.is_nan()),
            other => panic!("unexpected {other:?}"),
        }
        assert!(decode(r#"{"type":"F64","value":"huge"}"#).is_err());
    }

    #[test]
    fn test_wire_shapes() {
        assert_eq!(encode(&SqlValue::Null).unwrap(), r#"{"type":"Null"}"#);
        assert_eq!(
            encode(&SqlValue::U8(WideU8::new(255))).unwrap(),
            r#"{"type":"U8","value":255}"#
        );
        assert_eq!(
            encode(&SqlValue::Bytes(vec![0xca, 0xfe])).unwrap(),
            r#"{"type":"Bytes","value":"cafe"}"#
        );
        assert_eq!(
            encode(&SqlValue::big_int("-99").unwrap()).unwrap(),
            r#"{"type":"BigInt","value":"-99"}"#
        );
    }

    #[test]
    fn test_decode_revalidates_payloads() {
        for bad in [
            r#"{"type":"U8","value":256}"#,
            r#"{"type":"U16","value":-1}"#,
            r#"{"type":"BigInt","value":"12x"}"#,
            r#"{"type":"Date","value":"2024-13-45"}"#,
            r#"{"type":"Uuid","value":"not-a-uuid"}"#,
            r#"{"type":"Inet","value":"1.2.3"}"#,
            r#"{"type":"Bytes","value":"zz"}"#,
            r#"{"type":"Unknown","value":1}"#,
        ] {
            let err = decode(bad).unwrap_err();
            assert!(matches!(err, ValueError::Codec(_)), "{bad}: {err:?}");
        }
    }

    #[test]
    fn test_byte_round_trip() {
        let value = SqlValue::from(&[9u8, 8, 7][..]);
        let bytes = encode_to_vec(&value).unwrap();
        assert_eq!(decode_from_slice(&bytes).unwrap(), value);
    }
}
