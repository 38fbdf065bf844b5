//! Executable statement and expression trees.
//!
//! The executor never sees `sqlparser` types. Each parsed statement is
//! translated here into a narrower tree; anything outside the supported
//! surface is rejected with [`SqlError::Unsupported`] at this point rather
//! than during execution.

use std::fmt;

use sqlparser::ast as sql_ast;

use crate::error::{SqlError, SqlResult};
use crate::schema::ColumnDef;
use crate::types::ColumnType;
use crate::value::{Interval, Value};

/// An executable statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE
    CreateTable {
        /// Table name.
        name: String,
        /// Column definitions.
        columns: Vec<ColumnDef>,
        /// IF NOT EXISTS
        if_not_exists: bool,
    },
    /// DROP TABLE
    DropTable {
        /// Table names.
        names: Vec<String>,
        /// IF EXISTS
        if_exists: bool,
    },
    /// INSERT
    Insert {
        /// Target table.
        table: String,
        /// Explicit column list, empty for all columns.
        columns: Vec<String>,
        /// Row source.
        source: InsertSource,
    },
    /// SELECT
    Select(Box<Select>),
    /// UPDATE
    Update {
        /// Target table.
        table: String,
        /// `column = expr` pairs.
        assignments: Vec<(String, Expr)>,
        /// WHERE clause.
        selection: Option<Expr>,
    },
    /// DELETE
    Delete {
        /// Target table.
        table: String,
        /// WHERE clause.
        selection: Option<Expr>,
    },
    /// BEGIN / START TRANSACTION
    StartTransaction,
    /// COMMIT
    Commit,
    /// ROLLBACK
    Rollback,
    /// SHOW TABLES
    ShowTables,
    /// SHOW VERSION
    ShowVersion,
    /// SHOW COLUMNS FROM
    ShowColumns {
        /// Table name.
        table: String,
    },
}

/// Rows for an INSERT.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    /// VALUES lists.
    Values(Vec<Vec<Expr>>),
    /// A nested SELECT.
    Select(Box<Select>),
}

/// A SELECT query over at most one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    /// Projection.
    pub projection: Vec<SelectItem>,
    /// Source table, if any.
    pub from: Option<String>,
    /// WHERE clause.
    pub selection: Option<Expr>,
    /// ORDER BY terms.
    pub order_by: Vec<OrderBy>,
    /// LIMIT.
    pub limit: Option<Expr>,
    /// OFFSET.
    pub offset: Option<Expr>,
}

/// A projection item.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    /// `*`
    Wildcard,
    /// An expression with its output label.
    Expr {
        /// Expression.
        expr: Expr,
        /// Column label.
        label: String,
    },
}

/// An ORDER BY term.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    /// Sort key.
    pub expr: Expr,
    /// Ascending.
    pub asc: bool,
}

/// A scalar or aggregate expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference.
    Column(String),
    /// Constant.
    Literal(Value),
    /// Binary operation.
    Binary {
        /// Left operand.
        left: Box<Expr>,
        /// Operator.
        op: BinaryOp,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Unary operation.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        expr: Box<Expr>,
    },
    /// IS [NOT] NULL
    IsNull {
        /// Operand.
        expr: Box<Expr>,
        /// IS NOT NULL
        negated: bool,
    },
    /// [NOT] BETWEEN
    Between {
        /// Operand.
        expr: Box<Expr>,
        /// Lower bound.
        low: Box<Expr>,
        /// Upper bound.
        high: Box<Expr>,
        /// NOT BETWEEN
        negated: bool,
    },
    /// [NOT] IN (list)
    InList {
        /// Operand.
        expr: Box<Expr>,
        /// Candidates.
        list: Vec<Expr>,
        /// NOT IN
        negated: bool,
    },
    /// CAST(expr AS type)
    Cast {
        /// Operand.
        expr: Box<Expr>,
        /// Target type.
        target: ColumnType,
    },
    /// Scalar function call.
    Function {
        /// Function.
        func: ScalarFunc,
        /// Arguments.
        args: Vec<Expr>,
    },
    /// Aggregate call. `arg` is `None` for `COUNT(*)`.
    Aggregate {
        /// Function.
        func: AggregateFunc,
        /// Argument.
        arg: Option<Box<Expr>>,
    },
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Modulo,
    /// `||`
    Concat,
    /// `=`
    Eq,
    /// `<>`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// AND
    And,
    /// OR
    Or,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Concat => "||",
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
        };
        f.write_str(s)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// NOT
    Not,
    /// `-`
    Minus,
    /// `+`
    Plus,
}

/// Scalar functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarFunc {
    /// UPPER(text)
    Upper,
    /// LOWER(text)
    Lower,
    /// LENGTH(text | bytes | list | map)
    Length,
    /// ABS(number)
    Abs,
    /// COALESCE(a, b, ...)
    Coalesce,
    /// POINT(x, y)
    Point,
    /// GENERATE_UUID()
    GenerateUuid,
    /// NOW()
    Now,
}

/// Aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunc {
    /// COUNT
    Count,
    /// SUM
    Sum,
    /// MIN
    Min,
    /// MAX
    Max,
    /// AVG
    Avg,
}

impl Expr {
    /// Returns true if the expression contains an aggregate call.
    pub fn has_aggregate(&self) -> bool {
        match self {
            Expr::Aggregate { .. } => true,
            Expr::Column(_) | Expr::Literal(_) => false,
            Expr::Binary { left, right, .. } => left.has_aggregate() || right.has_aggregate(),
            Expr::Unary { expr, .. } | Expr::IsNull { expr, .. } | Expr::Cast { expr, .. } => {
                expr.has_aggregate()
            }
            Expr::Between {
                expr, low, high, ..
            } => expr.has_aggregate() || low.has_aggregate() || high.has_aggregate(),
            Expr::InList { expr, list, .. } => {
                expr.has_aggregate() || list.iter().any(Expr::has_aggregate)
            }
            Expr::Function { args, .. } => args.iter().any(Expr::has_aggregate),
        }
    }
}

// ============================================================================
// Translation from sqlparser
// ============================================================================

fn object_name(name: &sql_ast::ObjectName) -> SqlResult<String> {
    name.0
        .last()
        .map(|ident| ident.value.clone())
        .ok_or_else(|| SqlError::Syntax("empty object name".to_string()))
}

fn single_table(tables: &[sql_ast::TableWithJoins]) -> SqlResult<Option<String>> {
    match tables {
        [] => Ok(None),
        [table] if table.joins.is_empty() => match &table.relation {
            sql_ast::TableFactor::Table { name, .. } => object_name(name).map(Some),
            other => Err(SqlError::Unsupported(format!("table factor {}", other))),
        },
        _ => Err(SqlError::Unsupported(
            "joins and multiple tables".to_string(),
        )),
    }
}

fn required_table(tables: &[sql_ast::TableWithJoins]) -> SqlResult<String> {
    single_table(tables)?.ok_or_else(|| SqlError::Syntax("missing table name".to_string()))
}

impl Statement {
    /// Translates a parsed statement.
    pub fn from_sql_ast(stmt: sql_ast::Statement) -> SqlResult<Self> {
        match stmt {
            sql_ast::Statement::Query(query) => {
                Ok(Statement::Select(Box::new(Select::from_sql_ast(*query)?)))
            }
            sql_ast::Statement::Insert {
                table_name,
                columns,
                source,
                ..
            } => {
                let source = source.ok_or_else(|| {
                    SqlError::Unsupported("INSERT without VALUES or SELECT".to_string())
                })?;
                Ok(Statement::Insert {
                    table: object_name(&table_name)?,
                    columns: columns.into_iter().map(|c| c.value).collect(),
                    source: InsertSource::from_query(*source)?,
                })
            }
            sql_ast::Statement::Update {
                table,
                assignments,
                from,
                selection,
                ..
            } => {
                if from.is_some() {
                    return Err(SqlError::Unsupported("UPDATE ... FROM".to_string()));
                }
                let assignments = assignments
                    .into_iter()
                    .map(|a| {
                        let column = a
                            .id
                            .last()
                            .map(|ident| ident.value.clone())
                            .ok_or_else(|| SqlError::Syntax("empty assignment".to_string()))?;
                        Ok((column, Expr::from_sql_ast(a.value)?))
                    })
                    .collect::<SqlResult<Vec<_>>>()?;
                Ok(Statement::Update {
                    table: required_table(std::slice::from_ref(&table))?,
                    assignments,
                    selection: selection.map(Expr::from_sql_ast).transpose()?,
                })
            }
            sql_ast::Statement::Delete {
                from, selection, ..
            } => Ok(Statement::Delete {
                table: required_table(&from)?,
                selection: selection.map(Expr::from_sql_ast).transpose()?,
            }),
            sql_ast::Statement::CreateTable {
                name,
                columns,
                constraints,
                if_not_exists,
                ..
            } => {
                let mut defs = columns
                    .into_iter()
                    .map(column_def_from_sql_ast)
                    .collect::<SqlResult<Vec<_>>>()?;
                for constraint in constraints {
                    if let sql_ast::TableConstraint::Unique {
                        columns,
                        is_primary,
                        ..
                    } = constraint
                    {
                        for ident in columns {
                            let def = defs
                                .iter_mut()
                                .find(|d| d.name.eq_ignore_ascii_case(&ident.value))
                                .ok_or_else(|| SqlError::ColumnNotFound(ident.value.clone()))?;
                            def.unique = true;
                            if is_primary {
                                def.nullable = false;
                            }
                        }
                    }
                }
                Ok(Statement::CreateTable {
                    name: object_name(&name)?,
                    columns: defs,
                    if_not_exists,
                })
            }
            sql_ast::Statement::Drop {
                object_type: sql_ast::ObjectType::Table,
                if_exists,
                names,
                ..
            } => Ok(Statement::DropTable {
                names: names
                    .iter()
                    .map(object_name)
                    .collect::<SqlResult<Vec<_>>>()?,
                if_exists,
            }),
            sql_ast::Statement::StartTransaction { .. } => Ok(Statement::StartTransaction),
            sql_ast::Statement::Commit { .. } => Ok(Statement::Commit),
            sql_ast::Statement::Rollback { .. } => Ok(Statement::Rollback),
            sql_ast::Statement::ShowTables { .. } => Ok(Statement::ShowTables),
            sql_ast::Statement::ShowColumns { table_name, .. } => Ok(Statement::ShowColumns {
                table: object_name(&table_name)?,
            }),
            sql_ast::Statement::ShowVariable { variable } => {
                let name = variable
                    .iter()
                    .map(|ident| ident.value.to_ascii_uppercase())
                    .collect::<Vec<_>>()
                    .join(" ");
                match name.as_str() {
                    "VERSION" => Ok(Statement::ShowVersion),
                    "TABLES" => Ok(Statement::ShowTables),
                    _ => Err(SqlError::Unsupported(format!("SHOW {}", name))),
                }
            }
            other => Err(SqlError::Unsupported(format!("statement: {}", other))),
        }
    }
}

fn column_def_from_sql_ast(col: sql_ast::ColumnDef) -> SqlResult<ColumnDef> {
    let mut def = ColumnDef::new(
        col.name.value,
        ColumnType::from_sql_name(&col.data_type.to_string())?,
    );
    for option in col.options {
        match option.option {
            sql_ast::ColumnOption::NotNull => def.nullable = false,
            sql_ast::ColumnOption::Null => def.nullable = true,
            sql_ast::ColumnOption::Unique { is_primary, .. } => {
                def.unique = true;
                if is_primary {
                    def.nullable = false;
                }
            }
            other => {
                return Err(SqlError::Unsupported(format!("column option {}", other)));
            }
        }
    }
    Ok(def)
}

impl InsertSource {
    fn from_query(query: sql_ast::Query) -> SqlResult<Self> {
        match *query.body {
            sql_ast::SetExpr::Values(values) => {
                let rows = values
                    .rows
                    .into_iter()
                    .map(|row| row.into_iter().map(Expr::from_sql_ast).collect())
                    .collect::<SqlResult<Vec<Vec<_>>>>()?;
                Ok(InsertSource::Values(rows))
            }
            sql_ast::SetExpr::Select(_) => Ok(InsertSource::Select(Box::new(
                Select::from_sql_ast(query)?,
            ))),
            other => Err(SqlError::Unsupported(format!("INSERT source {}", other))),
        }
    }
}

impl Select {
    /// Translates a parsed query.
    pub fn from_sql_ast(query: sql_ast::Query) -> SqlResult<Self> {
        if query.with.is_some() {
            return Err(SqlError::Unsupported("WITH".to_string()));
        }
        let select = match *query.body {
            sql_ast::SetExpr::Select(select) => select,
            other => return Err(SqlError::Unsupported(format!("query body {}", other))),
        };

        if select.distinct.is_some() {
            return Err(SqlError::Unsupported("DISTINCT".to_string()));
        }
        match &select.group_by {
            sql_ast::GroupByExpr::Expressions(exprs) if exprs.is_empty() => {}
            _ => return Err(SqlError::Unsupported("GROUP BY".to_string())),
        }
        if select.having.is_some() {
            return Err(SqlError::Unsupported("HAVING".to_string()));
        }

        let projection = select
            .projection
            .into_iter()
            .map(SelectItem::from_sql_ast)
            .collect::<SqlResult<Vec<_>>>()?;

        let order_by = query
            .order_by
            .into_iter()
            .map(|o| {
                Ok(OrderBy {
                    expr: Expr::from_sql_ast(o.expr)?,
                    asc: o.asc.unwrap_or(true),
                })
            })
            .collect::<SqlResult<Vec<_>>>()?;

        Ok(Select {
            projection,
            from: single_table(&select.from)?,
            selection: select.selection.map(Expr::from_sql_ast).transpose()?,
            order_by,
            limit: query.limit.map(Expr::from_sql_ast).transpose()?,
            offset: query
                .offset
                .map(|o| Expr::from_sql_ast(o.value))
                .transpose()?,
        })
    }
}

impl SelectItem {
    fn from_sql_ast(item: sql_ast::SelectItem) -> SqlResult<Self> {
        match item {
            sql_ast::SelectItem::Wildcard(_) | sql_ast::SelectItem::QualifiedWildcard(..) => {
                Ok(SelectItem::Wildcard)
            }
            sql_ast::SelectItem::UnnamedExpr(expr) => {
                let label = match &expr {
                    sql_ast::Expr::Identifier(ident) => ident.value.clone(),
                    sql_ast::Expr::CompoundIdentifier(idents) => idents
                        .last()
                        .map(|ident| ident.value.clone())
                        .unwrap_or_default(),
                    other => other.to_string(),
                };
                Ok(SelectItem::Expr {
                    expr: Expr::from_sql_ast(expr)?,
                    label,
                })
            }
            sql_ast::SelectItem::ExprWithAlias { expr, alias } => Ok(SelectItem::Expr {
                expr: Expr::from_sql_ast(expr)?,
                label: alias.value,
            }),
        }
    }
}

impl Expr {
    /// Translates a parsed expression.
    pub fn from_sql_ast(expr: sql_ast::Expr) -> SqlResult<Self> {
        match expr {
            sql_ast::Expr::Identifier(ident) => Ok(Expr::Column(ident.value)),
            sql_ast::Expr::CompoundIdentifier(idents) => idents
                .into_iter()
                .last()
                .map(|ident| Expr::Column(ident.value))
                .ok_or_else(|| SqlError::Syntax("empty identifier".to_string())),
            sql_ast::Expr::Value(value) => literal_from_sql_ast(value).map(Expr::Literal),
            sql_ast::Expr::TypedString { data_type, value } => {
                let target = ColumnType::from_sql_name(&data_type.to_string())?;
                Value::Str(value).coerce(target).map(Expr::Literal)
            }
            sql_ast::Expr::Interval(interval) => interval_from_sql_ast(interval).map(Expr::Literal),
            sql_ast::Expr::BinaryOp { left, op, right } => Ok(Expr::Binary {
                left: Box::new(Expr::from_sql_ast(*left)?),
                op: binary_op_from_sql_ast(&op)?,
                right: Box::new(Expr::from_sql_ast(*right)?),
            }),
            sql_ast::Expr::UnaryOp { op, expr } => {
                let op = match op {
                    sql_ast::UnaryOperator::Not => UnaryOp::Not,
                    sql_ast::UnaryOperator::Minus => UnaryOp::Minus,
                    sql_ast::UnaryOperator::Plus => UnaryOp::Plus,
                    other => return Err(SqlError::Unsupported(format!("operator {}", other))),
                };
                Ok(Expr::Unary {
                    op,
                    expr: Box::new(Expr::from_sql_ast(*expr)?),
                })
            }
            sql_ast::Expr::Nested(expr) => Expr::from_sql_ast(*expr),
            sql_ast::Expr::IsNull(expr) => Ok(Expr::IsNull {
                expr: Box::new(Expr::from_sql_ast(*expr)?),
                negated: false,
            }),
            sql_ast::Expr::IsNotNull(expr) => Ok(Expr::IsNull {
                expr: Box::new(Expr::from_sql_ast(*expr)?),
                negated: true,
            }),
            sql_ast::Expr::Between {
                expr,
                negated,
                low,
                high,
            } => Ok(Expr::Between {
                expr: Box::new(Expr::from_sql_ast(*expr)?),
                low: Box::new(Expr::from_sql_ast(*low)?),
                high: Box::new(Expr::from_sql_ast(*high)?),
                negated,
            }),
            sql_ast::Expr::InList {
                expr,
                list,
                negated,
            } => Ok(Expr::InList {
                expr: Box::new(Expr::from_sql_ast(*expr)?),
                list: list
                    .into_iter()
                    .map(Expr::from_sql_ast)
                    .collect::<SqlResult<Vec<_>>>()?,
                negated,
            }),
            sql_ast::Expr::Cast {
                expr, data_type, ..
            } => Ok(Expr::Cast {
                expr: Box::new(Expr::from_sql_ast(*expr)?),
                target: ColumnType::from_sql_name(&data_type.to_string())?,
            }),
            sql_ast::Expr::Function(func) => function_from_sql_ast(func),
            other => Err(SqlError::Unsupported(format!("expression {}", other))),
        }
    }
}

fn literal_from_sql_ast(value: sql_ast::Value) -> SqlResult<Value> {
    match value {
        sql_ast::Value::Null => Ok(Value::Null),
        sql_ast::Value::Boolean(b) => Ok(Value::Bool(b)),
        sql_ast::Value::Number(n, _) => Value::parse_number(&n),
        sql_ast::Value::SingleQuotedString(s) | sql_ast::Value::DoubleQuotedString(s) => {
            Ok(Value::Str(s))
        }
        sql_ast::Value::HexStringLiteral(h) => hex::decode(&h)
            .map(Value::Bytea)
            .map_err(|_| SqlError::Syntax(format!("invalid hex literal X'{}'", h))),
        other => Err(SqlError::Unsupported(format!("literal {}", other))),
    }
}

fn interval_from_sql_ast(interval: sql_ast::Interval) -> SqlResult<Value> {
    let text = match *interval.value {
        sql_ast::Expr::Value(sql_ast::Value::SingleQuotedString(s)) => s,
        sql_ast::Expr::Value(sql_ast::Value::Number(n, _)) => n,
        other => return Err(SqlError::Unsupported(format!("interval value {}", other))),
    };
    let text = match interval.leading_field {
        Some(field) => format!("{} {}", text, field),
        None => text,
    };
    Interval::parse(&text).map(Value::Interval)
}

fn binary_op_from_sql_ast(op: &sql_ast::BinaryOperator) -> SqlResult<BinaryOp> {
    let op = match op {
        sql_ast::BinaryOperator::Plus => BinaryOp::Plus,
        sql_ast::BinaryOperator::Minus => BinaryOp::Minus,
        sql_ast::BinaryOperator::Multiply => BinaryOp::Multiply,
        sql_ast::BinaryOperator::Divide => BinaryOp::Divide,
        sql_ast::BinaryOperator::Modulo => BinaryOp::Modulo,
        sql_ast::BinaryOperator::StringConcat => BinaryOp::Concat,
        sql_ast::BinaryOperator::Eq => BinaryOp::Eq,
        sql_ast::BinaryOperator::NotEq => BinaryOp::NotEq,
        sql_ast::BinaryOperator::Lt => BinaryOp::Lt,
        sql_ast::BinaryOperator::LtEq => BinaryOp::LtEq,
        sql_ast::BinaryOperator::Gt => BinaryOp::Gt,
        sql_ast::BinaryOperator::GtEq => BinaryOp::GtEq,
        sql_ast::BinaryOperator::And => BinaryOp::And,
        sql_ast::BinaryOperator::Or => BinaryOp::Or,
        other => return Err(SqlError::Unsupported(format!("operator {}", other))),
    };
    Ok(op)
}

fn function_from_sql_ast(func: sql_ast::Function) -> SqlResult<Expr> {
    let name = func.name.to_string().to_ascii_uppercase();
    if func.distinct {
        return Err(SqlError::Unsupported(format!("{}(DISTINCT ...)", name)));
    }

    let mut wildcard = false;
    let mut args = Vec::with_capacity(func.args.len());
    for arg in func.args {
        match arg {
            sql_ast::FunctionArg::Unnamed(sql_ast::FunctionArgExpr::Expr(e)) => {
                args.push(Expr::from_sql_ast(e)?)
            }
            sql_ast::FunctionArg::Unnamed(sql_ast::FunctionArgExpr::Wildcard) => wildcard = true,
            other => return Err(SqlError::Unsupported(format!("function argument {}", other))),
        }
    }

    let aggregate = match name.as_str() {
        "COUNT" => Some(AggregateFunc::Count),
        "SUM" => Some(AggregateFunc::Sum),
        "MIN" => Some(AggregateFunc::Min),
        "MAX" => Some(AggregateFunc::Max),
        "AVG" => Some(AggregateFunc::Avg),
        _ => None,
    };
    if let Some(func) = aggregate {
        return match (wildcard, args.len()) {
            (true, 0) if func == AggregateFunc::Count => Ok(Expr::Aggregate { func, arg: None }),
            (false, 1) => Ok(Expr::Aggregate {
                func,
                arg: args.pop().map(Box::new),
            }),
            _ => Err(SqlError::Unsupported(format!("{} arguments", name))),
        };
    }
    if wildcard {
        return Err(SqlError::Unsupported(format!("{}(*)", name)));
    }

    let (func, arity) = match name.as_str() {
        "UPPER" => (ScalarFunc::Upper, Some(1)),
        "LOWER" => (ScalarFunc::Lower, Some(1)),
        "LENGTH" => (ScalarFunc::Length, Some(1)),
        "ABS" => (ScalarFunc::Abs, Some(1)),
        "COALESCE" => (ScalarFunc::Coalesce, None),
        "POINT" => (ScalarFunc::Point, Some(2)),
        "GENERATE_UUID" => (ScalarFunc::GenerateUuid, Some(0)),
        "NOW" => (ScalarFunc::Now, Some(0)),
        _ => return Err(SqlError::Unsupported(format!("function {}", name))),
    };
    if let Some(arity) = arity {
        if args.len() != arity {
            return Err(SqlError::Syntax(format!(
                "{} expects {} argument(s), got {}",
                name,
                arity,
                args.len()
            )));
        }
    }
    Ok(Expr::Function { func, args })
}
