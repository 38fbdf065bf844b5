//! Property tests for the value model and its wire codec.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv6Addr};

use chrono::NaiveDate;
use sqlbridge_value::{wire, SqlValue, ValueError, ValueKind, WideU16, WideU32, WideU8};

fn sample_values() -> Vec<SqlValue> {
    vec![
        SqlValue::Null,
        SqlValue::from(true),
        SqlValue::from(i8::MIN),
        SqlValue::from(i16::MAX),
        SqlValue::from(i32::MIN),
        SqlValue::from(i64::MAX),
        SqlValue::from(u8::MAX),
        SqlValue::from(u16::MAX),
        SqlValue::from(u32::MAX),
        SqlValue::from(1.5f32),
        SqlValue::from(-0.25f64),
        SqlValue::from(u128::MAX),
        SqlValue::from(i128::MIN),
        SqlValue::from("héllo, wörld"),
        SqlValue::from(vec![0u8, 1, 254, 255]),
        SqlValue::from(IpAddr::V6(Ipv6Addr::LOCALHOST)),
        SqlValue::from(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap()),
        SqlValue::timestamp("2024-01-02 03:04:05.678").unwrap(),
        SqlValue::time("23:59:59").unwrap(),
        SqlValue::interval("1 year 2 months").unwrap(),
        SqlValue::uuid("550e8400-e29b-41d4-a716-446655440000").unwrap(),
        SqlValue::point(-1.0, 2.5),
        SqlValue::list([SqlValue::from(1i64), SqlValue::Null]),
        SqlValue::try_map_from_pairs([("k", SqlValue::from("v"))]).unwrap(),
    ]
}

#[test]
fn test_every_variant_survives_the_wire() {
    for value in sample_values() {
        let text = wire::encode(&value).unwrap();
        let decoded = wire::decode(&text).unwrap();
        assert_eq!(decoded, value, "round trip changed {text}");
        assert_eq!(decoded.kind(), value.kind());
    }
}

#[test]
fn test_non_finite_floats_survive_the_wire() {
    for value in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
        let decoded = wire::decode(&wire::encode(&SqlValue::F64(value)).unwrap()).unwrap();
        let decoded = decoded.as_f64().unwrap();
        assert!(decoded == value || (decoded.is_nan() && value.is_nan()));
    }
}

#[test]
fn test_unsigned_values_widen_losslessly() {
    assert_eq!(WideU8::new(u8::MAX).get(), 255i16);
    assert_eq!(WideU16::new(u16::MAX).get(), 65_535i32);
    assert_eq!(WideU32::new(u32::MAX).get(), 4_294_967_295i64);

    // Widened slots stay distinct from the signed variant of the same width.
    assert_ne!(SqlValue::from(200u8), SqlValue::from(200i16));
    assert_eq!(SqlValue::from(200u8).as_i64(), Some(200));
}

#[test]
fn test_null_is_a_single_value() {
    assert_eq!(SqlValue::Null, SqlValue::NULL);
    assert_eq!(*SqlValue::null_ref(), SqlValue::default());
    assert!(std::ptr::eq(SqlValue::null_ref(), SqlValue::null_ref()));
    assert_eq!(SqlValue::from(None::<i32>), SqlValue::Null);
    assert_eq!(wire::decode(&wire::encode(&SqlValue::Null).unwrap()).unwrap(), SqlValue::Null);
}

#[test]
fn test_three_levels_of_nesting() {
    let leaf = SqlValue::list([SqlValue::from(1i32), SqlValue::from("two")]);
    let middle = SqlValue::map(HashMap::from([("leaf".to_string(), leaf)]));
    let outer = SqlValue::list([middle, SqlValue::Null]);

    assert_eq!(outer.depth(), 3);
    assert_eq!(outer.kind(), ValueKind::SqlList);

    let decoded = wire::decode(&wire::encode(&outer).unwrap()).unwrap();
    assert_eq!(decoded, outer);
    let inner = &decoded.as_list().unwrap()[0].as_map().unwrap()["leaf"];
    assert_eq!(inner.as_list().unwrap()[1], SqlValue::from("two"));
}

#[test]
fn test_map_list_map_nesting() {
    let innermost = SqlValue::try_map_from_pairs([
        ("n", SqlValue::from(999i32)),
        ("s", SqlValue::from("deep")),
    ])
    .unwrap();
    let outer = SqlValue::try_map_from_pairs([("items", SqlValue::list([innermost]))]).unwrap();
    assert_eq!(outer.depth(), 3);

    let items = outer.as_map().unwrap()["items"].as_list().unwrap();
    let leaf = items[0].as_map().unwrap();
    assert_eq!(leaf["n"], SqlValue::I32(999));
    assert_eq!(leaf["s"].as_str(), Some("deep"));
}

#[test]
fn test_invalid_payloads_are_rejected() {
    assert!(matches!(
        SqlValue::date("2023-02-30"),
        Err(ValueError::InvalidValue { .. })
    ));
    assert!(SqlValue::inet("300.1.1.1").is_err());
    assert!(SqlValue::uuid("not-a-uuid").is_err());
    assert!(SqlValue::big_int("12x").is_err());
    assert!(SqlValue::try_map_from_pairs([("a", 1i32), ("a", 2i32)]).is_err());

    // A malformed document fails on decode instead of producing a bad value.
    assert!(wire::decode(r#"{"type":"Date","value":"yesterday"}"#).is_err());
}
