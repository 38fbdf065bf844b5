//! Serde helpers for floats in persisted values.
//!
//! JSON has no literal for NaN or the infinities, so non-finite floats are
//! written as the strings `"NaN"`, `"inf"` and `"-inf"`. Finite floats stay
//! plain numbers.

use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Number(f64),
    Text(String),
}

impl Repr {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            Repr::Number(v) => Ok(v),
            Repr::Text(text) => match text.as_str() {
                "NaN" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(E::custom(format!("invalid float literal {other:?}"))),
            },
        }
    }
}

fn name(nan: bool, positive: bool) -> &'static str {
    if nan {
        "NaN"
    } else if positive {
        "inf"
    } else {
        "-inf"
    }
}

pub(crate) mod f32_repr {
    use super::*;

    pub fn serialize<S: Serializer>(v: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        if v.is_finite() {
            serializer.serialize_f32(*v)
        } else {
            serializer.serialize_str(name(v.is_nan(), v.is_sign_positive()))
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        Repr::deserialize(deserializer)?.into_f64().map(|v| v as f32)
    }
}

pub(crate) mod f64_repr {
    use super::*;

    pub fn serialize<S: Serializer>(v: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if v.is_finite() {
            serializer.serialize_f64(*v)
        } else {
            serializer.serialize_str(name(v.is_nan(), v.is_sign_positive()))
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Repr::deserialize(deserializer)?.into_f64()
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use crate::value::Value;

    fn round_trip(value: &Value) -> Value {
        let text = serde_json::to_string(value).unwrap();
        serde_json::from_str(&text).unwrap_or_else(|e| panic!("{text}: {e}"))
    }

    #[test]
    fn test_non_finite_values() {
        assert_eq!(serde_json::to_string(&Value::F64(f64::INFINITY)).unwrap(), r#"{"F64":"inf"}"#);
        assert_eq!(round_trip(&Value::F64(f64::NEG_INFINITY)), Value::F64(f64::NEG_INFINITY));
        assert_eq!(round_trip(&Value::F32(f32::INFINITY)), Value::F32(f32::INFINITY));
        assert!(matches!(round_trip(&Value::F64(f64::NAN)), Value::F64(v) if v.is_nan()));

        let point = Value::Point {
            x: f64::NEG_INFINITY,
            y: 1.5,
        };
        assert_eq!(round_trip(&point), point);

        assert!(serde_json::from_str::<Value>(r#"{"F64":"infinity"}"#).is_err());
    }

    #[test]
    fn test_random_bit_patterns_are_exact() {
        let mut rng = StdRng::seed_from_u64(0xf10a7);
        for _ in 0..10_000 {
            let v = f64::from_bits(rng.gen::<u64>());
            if v.is_finite() {
                match round_trip(&Value::F64(v)) {
                    Value::F64(back) => assert_eq!(back.to_bits(), v.to_bits()),
                    other => panic!("unexpected value {other:?}"),
                }
            }
            let w = f32::from_bits(rng.gen::<u32>());
            if w.is_finite() {
                match round_trip(&Value::F32(w)) {
                    Value::F32(back) => assert_eq!(back.to_bits(), w.to_bits()),
                    other => panic!("unexpected value {other:?}"),
                }
            }
        }
    }
}
