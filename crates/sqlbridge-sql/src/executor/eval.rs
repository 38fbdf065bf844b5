//! Expression evaluation.

use std::cmp::Ordering;

use chrono::{Duration, Months, NaiveDateTime, NaiveTime, Utc};

use crate::ast::{AggregateFunc, BinaryOp, Expr, ScalarFunc, UnaryOp};
use crate::error::{SqlError, SqlResult};
use crate::schema::{Row, Schema};
use crate::types::ColumnType;
use crate::value::{integer_to, Interval, Value};

/// What column references resolve against.
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    /// No row: only constants are allowed.
    Empty,
    /// A single row of a table.
    Row {
        /// Table schema.
        schema: &'a Schema,
        /// Current row.
        row: &'a Row,
    },
    /// A group of rows, for aggregate projections.
    Group {
        /// Table schema, if the query has a FROM clause.
        schema: Option<&'a Schema>,
        /// Rows in the group.
        rows: &'a [Row],
    },
}

/// Evaluates an expression in the given scope.
pub fn evaluate(expr: &Expr, scope: Scope<'_>) -> SqlResult<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),

        Expr::Column(name) => match scope {
            Scope::Row { schema, row } => schema
                .column_index(name)
                .and_then(|i| row.get(i).cloned())
                .ok_or_else(|| SqlError::ColumnNotFound(name.clone())),
            Scope::Group { .. } => Err(SqlError::Unsupported(format!(
                "column {} outside an aggregate",
                name
            ))),
            Scope::Empty => Err(SqlError::ColumnNotFound(name.clone())),
        },

        Expr::Binary { left, op, right } => {
            let left = evaluate(left, scope)?;
            let right = evaluate(right, scope)?;
            binary(*op, left, right)
        }

        Expr::Unary { op, expr } => unary(*op, evaluate(expr, scope)?),

        Expr::IsNull { expr, negated } => {
            let is_null = evaluate(expr, scope)?.is_null();
            Ok(Value::Bool(is_null != *negated))
        }

        Expr::Between {
            expr,
            low,
            high,
            negated,
        } => {
            let value = evaluate(expr, scope)?;
            let low = evaluate(low, scope)?;
            let high = evaluate(high, scope)?;
            let above = compare(BinaryOp::GtEq, &value, &low)?;
            let below = compare(BinaryOp::LtEq, &value, &high)?;
            let inside = and(above, below);
            Ok(if *negated { not(inside) } else { inside })
        }

        Expr::InList {
            expr,
            list,
            negated,
        } => {
            let value = evaluate(expr, scope)?;
            if value.is_null() {
                return Ok(Value::Null);
            }
            let mut saw_null = false;
            for candidate in list {
                let candidate = evaluate(candidate, scope)?;
                match value.compare(&candidate) {
                    Some(Ordering::Equal) => return Ok(Value::Bool(!*negated)),
                    None if candidate.is_null() => saw_null = true,
                    _ => {}
                }
            }
            if saw_null {
                Ok(Value::Null)
            } else {
                Ok(Value::Bool(*negated))
            }
        }

        Expr::Cast { expr, target } => evaluate(expr, scope)?.coerce(*target),

        Expr::Function { func, args } => {
            let args = args
                .iter()
                .map(|arg| evaluate(arg, scope))
                .collect::<SqlResult<Vec<_>>>()?;
            scalar_function(*func, args)
        }

        Expr::Aggregate { func, arg } => match scope {
            Scope::Group { schema, rows } => aggregate(*func, arg.as_deref(), schema, rows),
            _ => Err(SqlError::Unsupported(
                "aggregate function in this context".to_string(),
            )),
        },
    }
}

/// Evaluates a WHERE predicate. NULL counts as false.
pub fn matches(predicate: Option<&Expr>, schema: &Schema, row: &Row) -> SqlResult<bool> {
    match predicate {
        None => Ok(true),
        Some(expr) => Ok(evaluate(expr, Scope::Row { schema, row })?
            .truthy()?
            .unwrap_or(false)),
    }
}

fn binary(op: BinaryOp, left: Value, right: Value) -> SqlResult<Value> {
    match op {
        BinaryOp::And => Ok(and(left.truthy()?, right.truthy()?)),
        BinaryOp::Or => Ok(or(left.truthy()?, right.truthy()?)),
        BinaryOp::Eq
        | BinaryOp::NotEq
        | BinaryOp::Lt
        | BinaryOp::LtEq
        | BinaryOp::Gt
        | BinaryOp::GtEq => compare(op, &left, &right).map(|r| r.map_or(Value::Null, Value::Bool)),
        BinaryOp::Concat => concat(left, right),
        BinaryOp::Plus
        | BinaryOp::Minus
        | BinaryOp::Multiply
        | BinaryOp::Divide
        | BinaryOp::Modulo => arithmetic(op, left, right),
    }
}

fn invalid_operands(op: impl ToString, left: &Value, right: &Value) -> SqlError {
    SqlError::InvalidOperands {
        op: op.to_string(),
        left: left.type_name().to_string(),
        right: right.type_name().to_string(),
    }
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> SqlResult<Option<bool>> {
    if left.is_null() || right.is_null() {
        return Ok(None);
    }
    let ordering = left
        .compare(right)
        .ok_or_else(|| invalid_operands(op, left, right))?;
    let result = match op {
        BinaryOp::Eq => ordering == Ordering::Equal,
        BinaryOp::NotEq => ordering != Ordering::Equal,
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::LtEq => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::GtEq => ordering != Ordering::Less,
        _ => return Err(invalid_operands(op, left, right)),
    };
    Ok(Some(result))
}

fn and(left: Option<bool>, right: Option<bool>) -> Value {
    match (left, right) {
        (Some(false), _) | (_, Some(false)) => Value::Bool(false),
        (Some(true), Some(true)) => Value::Bool(true),
        _ => Value::Null,
    }
}

fn or(left: Option<bool>, right: Option<bool>) -> Value {
    match (left, right) {
        (Some(true), _) | (_, Some(true)) => Value::Bool(true),
        (Some(false), Some(false)) => Value::Bool(false),
        _ => Value::Null,
    }
}

fn not(value: Value) -> Value {
    match value {
        Value::Bool(b) => Value::Bool(!b),
        other => other,
    }
}

fn concat(left: Value, right: Value) -> SqlResult<Value> {
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        (Value::List(mut a), Value::List(b)) => {
            a.extend(b);
            Ok(Value::List(a))
        }
        (Value::Bytea(mut a), Value::Bytea(b)) => {
            a.extend(b);
            Ok(Value::Bytea(a))
        }
        (left, right) => Ok(Value::Str(format!("{}{}", text_of(&left), text_of(&right)))),
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::Str(s) => s.clone(),
        other => other.to_string(),
    }
}

fn arithmetic(op: BinaryOp, left: Value, right: Value) -> SqlResult<Value> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }

    if left.is_integer() && right.is_integer() {
        if let (Some(a), Some(b)) = (left.as_i128(), right.as_i128()) {
            return integer_arithmetic(op, a, b, &left, &right);
        }
    }

    if (left.is_integer() || left.is_float()) && (right.is_integer() || right.is_float()) {
        let (a, b) = match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(invalid_operands(op, &left, &right)),
        };
        if matches!(op, BinaryOp::Divide | BinaryOp::Modulo) && b == 0.0 {
            return Err(SqlError::DivisionByZero);
        }
        let result = match op {
            BinaryOp::Plus => a + b,
            BinaryOp::Minus => a - b,
            BinaryOp::Multiply => a * b,
            BinaryOp::Divide => a / b,
            _ => a % b,
        };
        return Ok(match (&left, &right) {
            (Value::F32(_), Value::F32(_)) => Value::F32(result as f32),
            _ => Value::F64(result),
        });
    }

    temporal_arithmetic(op, left, right)
}

fn integer_arithmetic(
    op: BinaryOp,
    a: i128,
    b: i128,
    left: &Value,
    right: &Value,
) -> SqlResult<Value> {
    if matches!(op, BinaryOp::Divide | BinaryOp::Modulo) && b == 0 {
        return Err(SqlError::DivisionByZero);
    }
    let result = match op {
        BinaryOp::Plus => a.checked_add(b),
        BinaryOp::Minus => a.checked_sub(b),
        BinaryOp::Multiply => a.checked_mul(b),
        BinaryOp::Divide => a.checked_div(b),
        _ => a.checked_rem(b),
    }
    .ok_or_else(|| SqlError::Overflow(op.to_string()))?;

    // Same-typed operands keep their type; mixed ones widen.
    let same_type = left.integer_type().filter(|t| Some(*t) == right.integer_type());
    match same_type {
        Some(ty) => integer_to(result, ty).ok_or_else(|| SqlError::Overflow(op.to_string())),
        None => Ok(i64::try_from(result)
            .map(Value::I64)
            .unwrap_or(Value::I128(result))),
    }
}

fn temporal_arithmetic(op: BinaryOp, left: Value, right: Value) -> SqlResult<Value> {
    let overflow = || SqlError::Overflow(op.to_string());
    match (op, &left, &right) {
        (BinaryOp::Plus | BinaryOp::Minus, Value::Date(d), Value::Interval(i)) => {
            let ts = d.and_time(NaiveTime::MIN);
            shift(ts, *i, op == BinaryOp::Minus)
                .map(Value::Timestamp)
                .ok_or_else(overflow)
        }
        (BinaryOp::Plus | BinaryOp::Minus, Value::Timestamp(ts), Value::Interval(i)) => {
            shift(*ts, *i, op == BinaryOp::Minus)
                .map(Value::Timestamp)
                .ok_or_else(overflow)
        }
        (BinaryOp::Plus, Value::Interval(i), Value::Timestamp(ts)) => {
            shift(*ts, *i, false).map(Value::Timestamp).ok_or_else(overflow)
        }
        (BinaryOp::Minus, Value::Timestamp(a), Value::Timestamp(b)) => (*a - *b)
            .num_microseconds()
            .map(|us| Value::Interval(Interval::Microsecond(us)))
            .ok_or_else(overflow),
        (BinaryOp::Minus, Value::Date(a), Value::Date(b)) => {
            (*a - *b)
                .num_microseconds()
                .map(|us| Value::Interval(Interval::Microsecond(us)))
                .ok_or_else(overflow)
        }
        (BinaryOp::Plus | BinaryOp::Minus, Value::Interval(a), Value::Interval(b)) => {
            let minus = op == BinaryOp::Minus;
            match (a, b) {
                (Interval::Month(x), Interval::Month(y)) => {
                    let m = if minus { x.checked_sub(*y) } else { x.checked_add(*y) };
                    m.map(|m| Value::Interval(Interval::Month(m)))
                        .ok_or_else(overflow)
                }
                (Interval::Microsecond(x), Interval::Microsecond(y)) => {
                    let us = if minus { x.checked_sub(*y) } else { x.checked_add(*y) };
                    us.map(|us| Value::Interval(Interval::Microsecond(us)))
                        .ok_or_else(overflow)
                }
                _ => Err(invalid_operands(op, &left, &right)),
            }
        }
        _ => Err(invalid_operands(op, &left, &right)),
    }
}

fn shift(ts: NaiveDateTime, interval: Interval, subtract: bool) -> Option<NaiveDateTime> {
    match interval {
        Interval::Month(m) => {
            let forward = (m >= 0) != subtract;
            let months = Months::new(m.unsigned_abs());
            if forward {
                ts.checked_add_months(months)
            } else {
                ts.checked_sub_months(months)
            }
        }
        Interval::Microsecond(us) => {
            let delta = Duration::microseconds(us);
            if subtract {
                ts.checked_sub_signed(delta)
            } else {
                ts.checked_add_signed(delta)
            }
        }
    }
}

fn unary(op: UnaryOp, value: Value) -> SqlResult<Value> {
    match (op, value) {
        (_, Value::Null) => Ok(Value::Null),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Plus, v) if v.is_integer() || v.is_float() => Ok(v),
        (UnaryOp::Minus, Value::F32(f)) => Ok(Value::F32(-f)),
        (UnaryOp::Minus, Value::F64(f)) => Ok(Value::F64(-f)),
        (UnaryOp::Minus, Value::Interval(Interval::Month(m))) => m
            .checked_neg()
            .map(|m| Value::Interval(Interval::Month(m)))
            .ok_or_else(|| SqlError::Overflow("-".to_string())),
        (UnaryOp::Minus, Value::Interval(Interval::Microsecond(us))) => us
            .checked_neg()
            .map(|us| Value::Interval(Interval::Microsecond(us)))
            .ok_or_else(|| SqlError::Overflow("-".to_string())),
        (UnaryOp::Minus, v) if v.is_integer() => {
            let n = v.as_i128().ok_or_else(|| SqlError::Overflow("-".to_string()))?;
            let negated = n.checked_neg().ok_or_else(|| SqlError::Overflow("-".to_string()))?;
            // Unsigned values become signed when negated.
            let ty = match v.integer_type() {
                Some(ColumnType::Uint8) => ColumnType::Int16,
                Some(ColumnType::Uint16) => ColumnType::Int32,
                Some(ColumnType::Uint32) | Some(ColumnType::Uint64) => ColumnType::Int64,
                Some(ColumnType::Uint128) => ColumnType::Int128,
                Some(ty) => ty,
                None => ColumnType::Int128,
            };
            integer_to(negated, ty)
                .or_else(|| integer_to(negated, ColumnType::Int128))
                .ok_or_else(|| SqlError::Overflow("-".to_string()))
        }
        (op, v) => Err(SqlError::InvalidOperands {
            op: format!("{:?}", op).to_uppercase(),
            left: v.type_name().to_string(),
            right: String::new(),
        }),
    }
}

fn scalar_function(func: ScalarFunc, mut args: Vec<Value>) -> SqlResult<Value> {
    let incompatible = |name: &str, v: &Value| SqlError::InvalidOperands {
        op: name.to_string(),
        left: v.type_name().to_string(),
        right: String::new(),
    };

    match func {
        ScalarFunc::Coalesce => Ok(args
            .into_iter()
            .find(|v| !v.is_null())
            .unwrap_or(Value::Null)),
        ScalarFunc::GenerateUuid => Ok(Value::Uuid(uuid::Uuid::new_v4().as_u128())),
        ScalarFunc::Now => Ok(Value::Timestamp(Utc::now().naive_utc())),
        ScalarFunc::Point => {
            let y = args.pop().unwrap_or(Value::Null);
            let x = args.pop().unwrap_or(Value::Null);
            match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => Ok(Value::Point { x, y }),
                _ if x.is_null() || y.is_null() => Ok(Value::Null),
                _ => Err(invalid_operands("POINT", &x, &y)),
            }
        }
        ScalarFunc::Upper | ScalarFunc::Lower | ScalarFunc::Length | ScalarFunc::Abs => {
            let arg = args.pop().unwrap_or(Value::Null);
            match (func, arg) {
                (_, Value::Null) => Ok(Value::Null),
                (ScalarFunc::Upper, Value::Str(s)) => Ok(Value::Str(s.to_uppercase())),
                (ScalarFunc::Lower, Value::Str(s)) => Ok(Value::Str(s.to_lowercase())),
                (ScalarFunc::Length, Value::Str(s)) => Ok(Value::I64(s.chars().count() as i64)),
                (ScalarFunc::Length, Value::Bytea(b)) => Ok(Value::I64(b.len() as i64)),
                (ScalarFunc::Length, Value::List(l)) => Ok(Value::I64(l.len() as i64)),
                (ScalarFunc::Length, Value::Map(m)) => Ok(Value::I64(m.len() as i64)),
                (ScalarFunc::Abs, Value::F32(f)) => Ok(Value::F32(f.abs())),
                (ScalarFunc::Abs, Value::F64(f)) => Ok(Value::F64(f.abs())),
                (ScalarFunc::Abs, v) if v.is_integer() => {
                    if v.as_i128().is_some_and(|n| n < 0) {
                        unary(UnaryOp::Minus, v)
                    } else {
                        Ok(v)
                    }
                }
                (func, v) => Err(incompatible(&format!("{:?}", func).to_uppercase(), &v)),
            }
        }
    }
}

fn aggregate(
    func: AggregateFunc,
    arg: Option<&Expr>,
    schema: Option<&Schema>,
    rows: &[Row],
) -> SqlResult<Value> {
    let Some(arg) = arg else {
        return Ok(Value::I64(rows.len() as i64));
    };

    let mut values = Vec::with_capacity(rows.len());
    for row in rows {
        let scope = match schema {
            Some(schema) => Scope::Row { schema, row },
            None => Scope::Empty,
        };
        let value = evaluate(arg, scope)?;
        if !value.is_null() {
            values.push(value);
        }
    }

    match func {
        AggregateFunc::Count => Ok(Value::I64(values.len() as i64)),
        AggregateFunc::Min | AggregateFunc::Max => {
            let mut best: Option<Value> = None;
            for value in values {
                best = match best {
                    None => Some(value),
                    Some(current) => {
                        let ordering = value
                            .compare(&current)
                            .ok_or_else(|| invalid_operands("MIN/MAX", &value, &current))?;
                        let replace = match func {
                            AggregateFunc::Min => ordering == Ordering::Less,
                            _ => ordering == Ordering::Greater,
                        };
                        Some(if replace { value } else { current })
                    }
                };
            }
            Ok(best.unwrap_or(Value::Null))
        }
        AggregateFunc::Sum => {
            if values.is_empty() {
                return Ok(Value::Null);
            }
            if values.iter().all(Value::is_integer) {
                let mut total: i128 = 0;
                for value in &values {
                    let n = value
                        .as_i128()
                        .ok_or_else(|| SqlError::Overflow("SUM".to_string()))?;
                    total = total
                        .checked_add(n)
                        .ok_or_else(|| SqlError::Overflow("SUM".to_string()))?;
                }
                return Ok(i64::try_from(total)
                    .map(Value::I64)
                    .unwrap_or(Value::I128(total)));
            }
            let mut total = 0.0;
            for value in &values {
                total += value
                    .as_f64()
                    .ok_or_else(|| invalid_operands("SUM", value, value))?;
            }
            Ok(Value::F64(total))
        }
        AggregateFunc::Avg => {
            if values.is_empty() {
                return Ok(Value::Null);
            }
            let mut sum = 0.0;
            for value in &values {
                sum += value
                    .as_f64()
                    .ok_or_else(|| invalid_operands("AVG", value, value))?;
            }
            Ok(Value::F64(sum / values.len() as f64))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDef;

    fn lit(v: Value) -> Box<Expr> {
        Box::new(Expr::Literal(v))
    }

    fn eval_const(expr: Expr) -> SqlResult<Value> {
        evaluate(&expr, Scope::Empty)
    }

    #[test]
    fn test_integer_arithmetic_keeps_type() {
        let expr = Expr::Binary {
            left: lit(Value::U8(200)),
            op: BinaryOp::Plus,
            right: lit(Value::U8(55)),
        };
        assert_eq!(eval_const(expr).unwrap(), Value::U8(255));

        let overflow = Expr::Binary {
            left: lit(Value::U8(200)),
            op: BinaryOp::Plus,
            right: lit(Value::U8(56)),
        };
        assert!(matches!(eval_const(overflow), Err(SqlError::Overflow(_))));

        let mixed = Expr::Binary {
            left: lit(Value::I8(1)),
            op: BinaryOp::Multiply,
            right: lit(Value::I32(7)),
        };
        assert_eq!(eval_const(mixed).unwrap(), Value::I64(7));
    }

    #[test]
    fn test_division_by_zero() {
        for zero in [Value::I64(0), Value::F64(0.0)] {
            let expr = Expr::Binary {
                left: lit(Value::I64(1)),
                op: BinaryOp::Divide,
                right: lit(zero),
            };
            assert!(matches!(eval_const(expr), Err(SqlError::DivisionByZero)));
        }
    }

    #[test]
    fn test_three_valued_logic() {
        let expr = Expr::Binary {
            left: lit(Value::Null),
            op: BinaryOp::Or,
            right: lit(Value::Bool(true)),
        };
        assert_eq!(eval_const(expr).unwrap(), Value::Bool(true));

        let expr = Expr::Binary {
            left: lit(Value::Null),
            op: BinaryOp::And,
            right: lit(Value::Bool(true)),
        };
        assert_eq!(eval_const(expr).unwrap(), Value::Null);

        let expr = Expr::InList {
            expr: lit(Value::I64(3)),
            list: vec![Expr::Literal(Value::I64(1)), Expr::Literal(Value::Null)],
            negated: false,
        };
        assert_eq!(eval_const(expr).unwrap(), Value::Null);
    }

    #[test]
    fn test_comparison_type_mismatch() {
        let expr = Expr::Binary {
            left: lit(Value::Str("a".into())),
            op: BinaryOp::Lt,
            right: lit(Value::I64(1)),
        };
        assert!(matches!(
            eval_const(expr),
            Err(SqlError::InvalidOperands { .. })
        ));
    }

    #[test]
    fn test_timestamp_interval_arithmetic() {
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let expr = Expr::Binary {
            left: lit(Value::Timestamp(ts)),
            op: BinaryOp::Plus,
            right: lit(Value::Interval(Interval::Month(1))),
        };
        assert_eq!(
            eval_const(expr).unwrap().to_string(),
            "2024-02-29 12:00:00"
        );
    }

    #[test]
    fn test_interval_arithmetic_overflow() {
        let minus_min = Expr::Binary {
            left: lit(Value::Interval(Interval::Month(0))),
            op: BinaryOp::Minus,
            right: lit(Value::Interval(Interval::Month(i32::MIN))),
        };
        assert!(matches!(eval_const(minus_min), Err(SqlError::Overflow(_))));

        let sum = Expr::Binary {
            left: lit(Value::Interval(Interval::Microsecond(i64::MAX))),
            op: BinaryOp::Plus,
            right: lit(Value::Interval(Interval::Microsecond(1))),
        };
        assert!(matches!(eval_const(sum), Err(SqlError::Overflow(_))));

        let negate = Expr::Unary {
            op: UnaryOp::Minus,
            expr: lit(Value::Interval(Interval::Month(i32::MIN))),
        };
        assert!(matches!(eval_const(negate), Err(SqlError::Overflow(_))));

        let span = Expr::Binary {
            left: lit(Value::Date(chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())),
            op: BinaryOp::Minus,
            right: lit(Value::Date(chrono::NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())),
        };
        assert_eq!(eval_const(span).unwrap().to_string(), "29 days 00:00:00");
    }

    #[test]
    fn test_column_scope() {
        let schema = Schema::new("t", vec![ColumnDef::new("a", ColumnType::Int64)]);
        let row = vec![Value::I64(4)];
        let expr = Expr::Column("A".into());
        assert_eq!(
            evaluate(&expr, Scope::Row { schema: &schema, row: &row }).unwrap(),
            Value::I64(4)
        );
        assert!(matches!(
            evaluate(&Expr::Column("b".into()), Scope::Row { schema: &schema, row: &row }),
            Err(SqlError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_aggregates() {
        let schema = Schema::new("t", vec![ColumnDef::new("a", ColumnType::Int32)]);
        let rows = vec![vec![Value::I32(3)], vec![Value::Null], vec![Value::I32(9)]];
        let scope = Scope::Group {
            schema: Some(&schema),
            rows: &rows,
        };
        let agg = |func, arg: Option<Expr>| Expr::Aggregate {
            func,
            arg: arg.map(Box::new),
        };
        let col = || Some(Expr::Column("a".into()));

        assert_eq!(evaluate(&agg(AggregateFunc::Count, None), scope).unwrap(), Value::I64(3));
        assert_eq!(evaluate(&agg(AggregateFunc::Count, col()), scope).unwrap(), Value::I64(2));
        assert_eq!(evaluate(&agg(AggregateFunc::Sum, col()), scope).unwrap(), Value::I64(12));
        assert_eq!(evaluate(&agg(AggregateFunc::Min, col()), scope).unwrap(), Value::I32(3));
        assert_eq!(evaluate(&agg(AggregateFunc::Max, col()), scope).unwrap(), Value::I32(9));
        assert_eq!(evaluate(&agg(AggregateFunc::Avg, col()), scope).unwrap(), Value::F64(6.0));
        assert!(evaluate(&Expr::Column("a".into()), scope).is_err());
    }

    #[test]
    fn test_scalar_functions() {
        let call = |func, args: Vec<Value>| Expr::Function {
            func,
            args: args.into_iter().map(Expr::Literal).collect(),
        };
        assert_eq!(
            eval_const(call(ScalarFunc::Upper, vec![Value::Str("abc".into())])).unwrap(),
            Value::Str("ABC".into())
        );
        assert_eq!(
            eval_const(call(ScalarFunc::Length, vec![Value::Str("世界".into())])).unwrap(),
            Value::I64(2)
        );
        assert_eq!(
            eval_const(call(ScalarFunc::Abs, vec![Value::I32(-5)])).unwrap(),
            Value::I32(5)
        );
        assert_eq!(
            eval_const(call(ScalarFunc::Coalesce, vec![Value::Null, Value::I64(2)])).unwrap(),
            Value::I64(2)
        );
        assert_eq!(
            eval_const(call(ScalarFunc::Point, vec![Value::I64(1), Value::F64(2.5)])).unwrap(),
            Value::Point { x: 1.0, y: 2.5 }
        );
        assert!(matches!(
            eval_const(call(ScalarFunc::GenerateUuid, vec![])).unwrap(),
            Value::Uuid(_)
        ));
    }
}
