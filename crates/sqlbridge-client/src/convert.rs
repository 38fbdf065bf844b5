//! Conversion from engine values and payloads into client results.

use sqlbridge_sql::{Payload, Value, Variable};
use sqlbridge_value::{self as sv, SqlValue, ValueResult};

use crate::result::QueryResult;

/// Converts an engine value into a [`SqlValue`].
///
/// Integers wider than 64 bits (and `u64`) become decimal `BigInt` text.
/// Temporal values are rendered with millisecond precision.
pub fn to_sql_value(value: Value) -> ValueResult<SqlValue> {
    let converted = match value {
        Value::Null => SqlValue::Null,
        Value::Bool(v) => SqlValue::Bool(v),
        Value::I8(v) => SqlValue::I8(v),
        Value::I16(v) => SqlValue::I16(v),
        Value::I32(v) => SqlValue::I32(v),
        Value::I64(v) => SqlValue::I64(v),
        Value::I128(v) => SqlValue::BigInt(v.into()),
        Value::U8(v) => SqlValue::U8(v.into()),
        Value::U16(v) => SqlValue::U16(v.into()),
        Value::U32(v) => SqlValue::U32(v.into()),
        Value::U64(v) => SqlValue::BigInt(v.into()),
        Value::U128(v) => SqlValue::BigInt(v.into()),
        Value::F32(v) => SqlValue::F32(v),
        Value::F64(v) => SqlValue::F64(v),
        Value::Str(v) => SqlValue::Str(v),
        Value::Bytea(v) => SqlValue::Bytes(v),
        Value::Inet(v) => SqlValue::Inet(v.into()),
        Value::Date(v) => SqlValue::Date(v.into()),
        Value::Timestamp(v) => SqlValue::Timestamp(v.into()),
        Value::Time(v) => SqlValue::Time(v.into()),
        Value::Interval(v) => SqlValue::Interval(sv::Interval::new(v.to_string())?),
        Value::Uuid(v) => SqlValue::Uuid(uuid::Uuid::from_u128(v).into()),
        Value::Map(map) => SqlValue::SqlMap(
            map.into_iter()
                .map(|(k, v)| Ok((k, to_sql_value(v)?)))
                .collect::<ValueResult<_>>()?,
        ),
        Value::List(items) => SqlValue::SqlList(
            items
                .into_iter()
                .map(to_sql_value)
                .collect::<ValueResult<_>>()?,
        ),
        Value::Point { x, y } => SqlValue::SqlPoint(sv::Point::new(x, y)),
    };
    Ok(converted)
}

/// Converts an engine payload into a [`QueryResult`].
pub fn to_query_result(payload: Payload) -> ValueResult<QueryResult> {
    let result = match payload {
        Payload::Create => QueryResult::Create,
        Payload::DropTable(count) => QueryResult::DropTable { count },
        Payload::Insert(rows) => QueryResult::Insert { rows },
        Payload::Update(rows) => QueryResult::Update { rows },
        Payload::Delete(rows) => QueryResult::Delete { rows },
        Payload::Select { labels, rows } => QueryResult::Select {
            labels,
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(to_sql_value).collect())
                .collect::<ValueResult<_>>()?,
        },
        Payload::StartTransaction => QueryResult::StartTransaction,
        Payload::Commit => QueryResult::Commit,
        Payload::Rollback => QueryResult::Rollback,
        Payload::ShowVariable(Variable::Tables(names)) => QueryResult::ShowVariable {
            name: "tables".to_string(),
            value: SqlValue::SqlList(names.into_iter().map(SqlValue::Str).collect()),
        },
        Payload::ShowVariable(Variable::Version(version)) => QueryResult::ShowVariable {
            name: "version".to_string(),
            value: SqlValue::Str(version),
        },
        Payload::ShowColumns(columns) => QueryResult::ShowColumns {
            columns: columns
                .into_iter()
                .map(|(name, ty)| (name, ty.sql_name().to_string()))
                .collect(),
        },
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;
    use sqlbridge_sql::{ColumnType, Interval};

    use super::*;

    #[test]
    fn test_integer_widths() {
        assert_eq!(to_sql_value(Value::U8(255)).unwrap(), SqlValue::from(255u8));
        assert_eq!(
            to_sql_value(Value::U32(u32::MAX)).unwrap(),
            SqlValue::U32(u32::MAX.into())
        );
        assert_eq!(
            to_sql_value(Value::U64(u64::MAX)).unwrap(),
            SqlValue::big_int("18446744073709551615").unwrap()
        );
        assert_eq!(
            to_sql_value(Value::I128(-5)).unwrap(),
            SqlValue::big_int("-5").unwrap()
        );
    }

    #[test]
    fn test_temporal_and_identifiers() {
        let ts = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_milli_opt(7, 8, 9, 10)
            .unwrap();
        assert_eq!(
            to_sql_value(Value::Timestamp(ts)).unwrap(),
            SqlValue::timestamp("2024-05-06 07:08:09.010").unwrap()
        );
        assert_eq!(
            to_sql_value(Value::Interval(Interval::Month(14))).unwrap(),
            SqlValue::interval("1 year 2 months").unwrap()
        );
        assert_eq!(
            to_sql_value(Value::Uuid(0x550e8400_e29b_41d4_a716_446655440000)).unwrap(),
            SqlValue::uuid("550e8400-e29b-41d4-a716-446655440000").unwrap()
        );
    }

    #[test]
    fn test_nested_containers() {
        let inner = HashMap::from([("k".to_string(), Value::I32(999))]);
        let outer = HashMap::from([(
            "list".to_string(),
            Value::List(vec![Value::Map(inner), Value::Str("deep".into())]),
        )]);
        let converted = to_sql_value(Value::Map(outer)).unwrap();
        assert_eq!(converted.depth(), 3);
    }

    #[test]
    fn test_payloads() {
        assert_eq!(
            to_query_result(Payload::Insert(2)).unwrap(),
            QueryResult::Insert { rows: 2 }
        );
        assert_eq!(
            to_query_result(Payload::ShowColumns(vec![("id".into(), ColumnType::Int64)])).unwrap(),
            QueryResult::ShowColumns {
                columns: vec![("id".into(), "INT64".into())]
            }
        );
        assert_eq!(
            to_query_result(Payload::ShowVariable(Variable::Tables(vec!["t".into()]))).unwrap(),
            QueryResult::ShowVariable {
                name: "tables".into(),
                value: SqlValue::list(vec![SqlValue::from("t")]),
            }
        );
    }
}
