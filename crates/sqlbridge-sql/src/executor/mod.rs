//! Statement execution.
//!
//! The [`Engine`] owns a storage backend and runs statements against it one
//! at a time. Every statement is checked completely before anything is
//! written, so a failing statement leaves its table untouched.
//!
//! # Example
//!
//! ```
//! use sqlbridge_sql::{storage, Engine, Payload};
//!
//! let mut engine = Engine::new(storage::memory());
//! let results = engine
//!     .execute("CREATE TABLE t (id INTEGER); INSERT INTO t VALUES (1), (2);")
//!     .unwrap();
//! assert_eq!(results[1], Payload::Insert(2));
//! ```

mod eval;
mod payload;

use std::collections::HashSet;

use tracing::{debug, info, instrument};

use crate::ast::{InsertSource, Select, SelectItem, Statement};
use crate::error::{SqlError, SqlResult};
use crate::parser::{parse_statement, split_statements};
use crate::schema::{Row, Schema};
use crate::storage::Storage;
use crate::value::Value;

pub use eval::{evaluate, matches, Scope};
pub use payload::{Payload, Variable};

/// Executes statements against a storage backend.
pub struct Engine {
    storage: Box<dyn Storage>,
    in_transaction: bool,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("storage", &self.storage.name())
            .field("in_transaction", &self.in_transaction)
            .finish()
    }
}

impl Engine {
    /// Creates an engine over the given storage.
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self {
            storage,
            in_transaction: false,
        }
    }

    /// Returns the storage backend name.
    pub fn storage_name(&self) -> &str {
        self.storage.name()
    }

    /// Returns true while a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Returns a reference to the storage backend.
    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// Executes every statement in `sql`, in order, stopping at the first
    /// error. Statements before the failing one stay applied.
    pub fn execute(&mut self, sql: &str) -> SqlResult<Vec<Payload>> {
        split_statements(sql)
            .into_iter()
            .map(|stmt| self.execute_one(stmt))
            .collect()
    }

    /// Parses and executes a single statement.
    pub fn execute_one(&mut self, sql: &str) -> SqlResult<Payload> {
        let statement = parse_statement(sql)?;
        self.execute_statement(&statement)
    }

    /// Executes a parsed statement.
    #[instrument(level = "debug", skip_all, fields(storage = self.storage.name()))]
    pub fn execute_statement(&mut self, statement: &Statement) -> SqlResult<Payload> {
        match statement {
            Statement::CreateTable {
                name,
                columns,
                if_not_exists,
            } => {
                if self.storage.fetch_schema(name)?.is_some() {
                    if *if_not_exists {
                        return Ok(Payload::Create);
                    }
                    return Err(SqlError::TableExists(name.clone()));
                }
                let mut seen = HashSet::new();
                for column in columns {
                    if !seen.insert(column.name.to_ascii_lowercase()) {
                        return Err(SqlError::Syntax(format!(
                            "duplicate column name {}",
                            column.name
                        )));
                    }
                }
                self.storage
                    .insert_schema(&Schema::new(name.clone(), columns.clone()))?;
                info!(table = %name, columns = columns.len(), "created table");
                Ok(Payload::Create)
            }

            Statement::DropTable { names, if_exists } => {
                let mut existing = Vec::with_capacity(names.len());
                for name in names {
                    match self.storage.fetch_schema(name)? {
                        Some(_) => existing.push(name),
                        None if *if_exists => {}
                        None => return Err(SqlError::TableNotFound(name.clone())),
                    }
                }
                for name in &existing {
                    self.storage.delete_schema(name)?;
                }
                info!(count = existing.len(), "dropped tables");
                Ok(Payload::DropTable(existing.len() as u64))
            }

            Statement::Insert {
                table,
                columns,
                source,
            } => self.insert(table, columns, source),

            Statement::Select(select) => {
                let (labels, rows) = self.select(select)?;
                debug!(rows = rows.len(), "select");
                Ok(Payload::Select { labels, rows })
            }

            Statement::Update {
                table,
                assignments,
                selection,
            } => self.update(table, assignments, selection.as_ref()),

            Statement::Delete { table, selection } => {
                let schema = self.schema(table)?;
                let rows = self.storage.scan_rows(table)?;
                let before = rows.len();
                let mut kept = Vec::with_capacity(before);
                for row in rows {
                    if !matches(selection.as_ref(), &schema, &row)? {
                        kept.push(row);
                    }
                }
                let deleted = (before - kept.len()) as u64;
                if deleted > 0 {
                    self.storage.replace_rows(table, kept)?;
                }
                debug!(table = %table, rows = deleted, "delete");
                Ok(Payload::Delete(deleted))
            }

            Statement::StartTransaction => {
                if self.in_transaction {
                    return Err(SqlError::Transaction(
                        "transaction already in progress".to_string(),
                    ));
                }
                self.storage.begin()?;
                self.in_transaction = true;
                debug!("transaction started");
                Ok(Payload::StartTransaction)
            }

            Statement::Commit => {
                self.end_transaction("COMMIT")?;
                self.storage.commit()?;
                debug!("transaction committed");
                Ok(Payload::Commit)
            }

            Statement::Rollback => {
                self.end_transaction("ROLLBACK")?;
                self.storage.rollback()?;
                debug!("transaction rolled back");
                Ok(Payload::Rollback)
            }

            Statement::ShowTables => {
                let names = self
                    .storage
                    .fetch_schemas()?
                    .into_iter()
                    .map(|s| s.table_name)
                    .collect();
                Ok(Payload::ShowVariable(Variable::Tables(names)))
            }

            Statement::ShowVersion => Ok(Payload::ShowVariable(Variable::Version(
                env!("CARGO_PKG_VERSION").to_string(),
            ))),

            Statement::ShowColumns { table } => {
                let schema = self.schema(table)?;
                Ok(Payload::ShowColumns(
                    schema
                        .columns
                        .into_iter()
                        .map(|c| (c.name, c.data_type))
                        .collect(),
                ))
            }
        }
    }

    fn end_transaction(&mut self, verb: &str) -> SqlResult<()> {
        if !self.in_transaction {
            return Err(SqlError::Transaction(format!(
                "{} without an active transaction",
                verb
            )));
        }
        self.in_transaction = false;
        Ok(())
    }

    fn schema(&self, table: &str) -> SqlResult<Schema> {
        self.storage
            .fetch_schema(table)?
            .ok_or_else(|| SqlError::TableNotFound(table.to_string()))
    }

    // =========================================================================
    // Writes
    // =========================================================================

    fn insert(
        &mut self,
        table: &str,
        columns: &[String],
        source: &InsertSource,
    ) -> SqlResult<Payload> {
        let schema = self.schema(table)?;

        let targets: Vec<usize> = if columns.is_empty() {
            (0..schema.columns.len()).collect()
        } else {
            columns
                .iter()
                .map(|c| {
                    schema
                        .column_index(c)
                        .ok_or_else(|| SqlError::ColumnNotFound(c.clone()))
                })
                .collect::<SqlResult<_>>()?
        };

        let source_rows: Vec<Vec<Value>> = match source {
            InsertSource::Values(rows) => rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|expr| evaluate(expr, Scope::Empty))
                        .collect::<SqlResult<Vec<_>>>()
                })
                .collect::<SqlResult<_>>()?,
            InsertSource::Select(select) => self.select(select)?.1,
        };

        let mut rows = Vec::with_capacity(source_rows.len());
        for values in source_rows {
            if values.len() != targets.len() {
                return Err(SqlError::ColumnCountMismatch {
                    expected: targets.len(),
                    actual: values.len(),
                });
            }
            let mut row = vec![Value::Null; schema.columns.len()];
            for (&index, value) in targets.iter().zip(values) {
                row[index] = value;
            }
            rows.push(conform(&schema, row)?);
        }

        let mut existing = self.storage.scan_rows(table)?;
        let count = rows.len();
        existing.extend(rows.iter().cloned());
        check_unique(&schema, &existing)?;

        self.storage.append_rows(table, rows)?;
        debug!(table = %table, rows = count, "insert");
        Ok(Payload::Insert(count as u64))
    }

    fn update(
        &mut self,
        table: &str,
        assignments: &[(String, crate::ast::Expr)],
        selection: Option<&crate::ast::Expr>,
    ) -> SqlResult<Payload> {
        let schema = self.schema(table)?;
        let targets = assignments
            .iter()
            .map(|(column, expr)| {
                schema
                    .column_index(column)
                    .map(|i| (i, expr))
                    .ok_or_else(|| SqlError::ColumnNotFound(column.clone()))
            })
            .collect::<SqlResult<Vec<_>>>()?;

        let rows = self.storage.scan_rows(table)?;
        let mut updated = 0u64;
        let mut next = Vec::with_capacity(rows.len());
        for row in rows {
            if !matches(selection, &schema, &row)? {
                next.push(row);
                continue;
            }
            let mut new_row = row.clone();
            for (index, expr) in &targets {
                new_row[*index] = evaluate(expr, Scope::Row { schema: &schema, row: &row })?;
            }
            next.push(conform(&schema, new_row)?);
            updated += 1;
        }

        if updated > 0 {
            check_unique(&schema, &next)?;
            self.storage.replace_rows(table, next)?;
        }
        debug!(table = %table, rows = updated, "update");
        Ok(Payload::Update(updated))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    fn select(&self, select: &Select) -> SqlResult<(Vec<String>, Vec<Vec<Value>>)> {
        let (schema, source) = match &select.from {
            Some(table) => {
                let schema = self.schema(table)?;
                let rows = self.storage.scan_rows(table)?;
                (schema, rows)
            }
            None => (Schema::new("", Vec::new()), vec![Vec::new()]),
        };

        let mut filtered = Vec::with_capacity(source.len());
        for row in source {
            if matches(select.selection.as_ref(), &schema, &row)? {
                filtered.push(row);
            }
        }

        let labels = projection_labels(&select.projection, &schema);
        let aggregate = select.projection.iter().any(|item| match item {
            SelectItem::Expr { expr, .. } => expr.has_aggregate(),
            SelectItem::Wildcard => false,
        });

        let mut output: Vec<Vec<Value>> = if aggregate {
            let scope = Scope::Group {
                schema: Some(&schema),
                rows: &filtered,
            };
            let row = select
                .projection
                .iter()
                .map(|item| match item {
                    SelectItem::Expr { expr, .. } => evaluate(expr, scope),
                    SelectItem::Wildcard => Err(SqlError::Unsupported(
                        "wildcard with aggregate functions".to_string(),
                    )),
                })
                .collect::<SqlResult<Vec<_>>>()?;
            vec![row]
        } else {
            let mut keyed = Vec::with_capacity(filtered.len());
            for row in &filtered {
                let projected = project(&select.projection, &schema, row)?;
                let keys = select
                    .order_by
                    .iter()
                    .map(|term| sort_key(&term.expr, &schema, row, &labels, &projected))
                    .collect::<SqlResult<Vec<_>>>()?;
                keyed.push((keys, projected));
            }
            if !select.order_by.is_empty() {
                keyed.sort_by(|(a, _), (b, _)| {
                    for ((x, y), term) in a.iter().zip(b).zip(&select.order_by) {
                        let ordering = x.sort_cmp(y);
                        let ordering = if term.asc { ordering } else { ordering.reverse() };
                        if ordering.is_ne() {
                            return ordering;
                        }
                    }
                    std::cmp::Ordering::Equal
                });
            }
            keyed.into_iter().map(|(_, row)| row).collect()
        };

        let offset = bound(select.offset.as_ref(), "OFFSET")?.unwrap_or(0);
        let limit = bound(select.limit.as_ref(), "LIMIT")?;
        output = output
            .into_iter()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .collect();

        Ok((labels, output))
    }
}

fn projection_labels(projection: &[SelectItem], schema: &Schema) -> Vec<String> {
    projection
        .iter()
        .flat_map(|item| match item {
            SelectItem::Wildcard => schema.column_names(),
            SelectItem::Expr { label, .. } => vec![label.clone()],
        })
        .collect()
}

fn project(projection: &[SelectItem], schema: &Schema, row: &Row) -> SqlResult<Vec<Value>> {
    let mut out = Vec::with_capacity(projection.len());
    for item in projection {
        match item {
            SelectItem::Wildcard => out.extend(row.iter().cloned()),
            SelectItem::Expr { expr, .. } => out.push(evaluate(expr, Scope::Row { schema, row })?),
        }
    }
    Ok(out)
}

/// ORDER BY keys resolve against table columns first, then output labels.
fn sort_key(
    expr: &crate::ast::Expr,
    schema: &Schema,
    row: &Row,
    labels: &[String],
    projected: &[Value],
) -> SqlResult<Value> {
    match evaluate(expr, Scope::Row { schema, row }) {
        Err(SqlError::ColumnNotFound(name)) => labels
            .iter()
            .position(|label| label.eq_ignore_ascii_case(&name))
            .and_then(|i| projected.get(i).cloned())
            .ok_or(SqlError::ColumnNotFound(name)),
        other => other,
    }
}

fn bound(expr: Option<&crate::ast::Expr>, clause: &str) -> SqlResult<Option<usize>> {
    let Some(expr) = expr else {
        return Ok(None);
    };
    let value = evaluate(expr, Scope::Empty)?;
    value
        .as_i128()
        .filter(|_| value.is_integer())
        .and_then(|n| usize::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| SqlError::Incompatible {
            value: value.to_string(),
            target: format!("{} count", clause),
        })
}

/// Coerces a full row into the schema's column types and checks NOT NULL.
fn conform(schema: &Schema, row: Row) -> SqlResult<Row> {
    schema
        .columns
        .iter()
        .zip(row)
        .map(|(column, value)| {
            let value = value.coerce(column.data_type)?;
            if value.is_null() && !column.nullable {
                return Err(SqlError::NullViolation(column.name.clone()));
            }
            Ok(value)
        })
        .collect()
}

fn check_unique(schema: &Schema, rows: &[Row]) -> SqlResult<()> {
    for (index, column) in schema.columns.iter().enumerate() {
        if !column.unique {
            continue;
        }
        let mut seen = HashSet::with_capacity(rows.len());
        for row in rows {
            let value = &row[index];
            if value.is_null() {
                continue;
            }
            if !seen.insert(format!("{:?}", value)) {
                return Err(SqlError::UniqueViolation {
                    column: column.name.clone(),
                    value: value.to_string(),
                });
            }
        }
    }
    Ok(())
}
