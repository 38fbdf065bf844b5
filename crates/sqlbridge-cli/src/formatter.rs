//! Output formatting for query results.
//!
//! Supports table, JSON, CSV, and raw output formats.

use comfy_table::{Cell, ContentArrangement, Table};
use serde_json::{json, Value as JsonValue};

use sqlbridge_client::{QueryResult, SqlValue};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Formatted table output.
    Table,
    /// JSON output.
    Json,
    /// CSV output.
    Csv,
    /// Raw output (values separated by tabs).
    Raw,
}

impl OutputFormat {
    /// Parses a format name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "csv" => Some(OutputFormat::Csv),
            "raw" => Some(OutputFormat::Raw),
            _ => None,
        }
    }
}

/// Tabular view of a result: labels and rows.
struct Grid {
    labels: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
}

impl Grid {
    fn of(result: &QueryResult) -> Option<Self> {
        match result {
            QueryResult::Select { labels, rows } => Some(Grid {
                labels: labels.clone(),
                rows: rows.clone(),
            }),
            QueryResult::ShowColumns { columns } => Some(Grid {
                labels: vec!["name".to_string(), "type".to_string()],
                rows: columns
                    .iter()
                    .map(|(name, ty)| vec![SqlValue::from(name.as_str()), SqlValue::from(ty.as_str())])
                    .collect(),
            }),
            QueryResult::ShowVariable { name, value } => {
                let rows = match value {
                    SqlValue::SqlList(items) => items.iter().map(|v| vec![v.clone()]).collect(),
                    other => vec![vec![other.clone()]],
                };
                Some(Grid {
                    labels: vec![name.clone()],
                    rows,
                })
            }
            _ => None,
        }
    }
}

/// Formats a query result according to the specified format.
///
/// Results without rows render as a one-line status such as `INSERT 3`.
pub fn format_result(result: &QueryResult, format: OutputFormat) -> String {
    let Some(grid) = Grid::of(result) else {
        return status_line(result);
    };
    match format {
        OutputFormat::Table => format_table(&grid),
        OutputFormat::Json => format_json(&grid),
        OutputFormat::Csv => format_csv(&grid),
        OutputFormat::Raw => format_raw(&grid),
    }
}

/// Returns the number of rows a result displays, if it has rows.
pub fn row_count(result: &QueryResult) -> Option<usize> {
    Grid::of(result).map(|grid| grid.rows.len())
}

/// Formats a status line for results without rows.
pub fn status_line(result: &QueryResult) -> String {
    match result {
        QueryResult::Insert { rows } | QueryResult::Update { rows } | QueryResult::Delete { rows } => {
            format!("{} {}", result.kind_name(), rows)
        }
        QueryResult::DropTable { count } => format!("DROP TABLE {}", count),
        other => other.kind_name().to_string(),
    }
}

/// Formats the grid as a table.
fn format_table(grid: &Grid) -> String {
    let mut table = Table::new();

    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

    if !grid.labels.is_empty() {
        table.set_header(grid.labels.iter().map(Cell::new));
    }

    for row in &grid.rows {
        table.add_row(row.iter().map(|v| Cell::new(v.to_string())));
    }

    table.to_string()
}

/// Formats the grid as a JSON array of objects.
fn format_json(grid: &Grid) -> String {
    let rows: Vec<JsonValue> = grid
        .rows
        .iter()
        .map(|row| {
            let mut obj = serde_json::Map::new();
            for (i, value) in row.iter().enumerate() {
                let label = grid
                    .labels
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("column_{}", i));
                obj.insert(label, value_to_json(value));
            }
            JsonValue::Object(obj)
        })
        .collect();

    serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
}

/// Converts a value to plain JSON.
///
/// Integers that do not fit a JSON number exactly stay strings, bytes are
/// hex and non-finite floats are strings.
fn value_to_json(value: &SqlValue) -> JsonValue {
    match value {
        SqlValue::Null => JsonValue::Null,
        SqlValue::Bool(b) => json!(*b),
        SqlValue::I8(v) => json!(*v),
        SqlValue::I16(v) => json!(*v),
        SqlValue::I32(v) => json!(*v),
        SqlValue::I64(v) => json!(*v),
        SqlValue::U8(v) => json!(v.get()),
        SqlValue::U16(v) => json!(v.get()),
        SqlValue::U32(v) => json!(v.get()),
        SqlValue::F32(v) => float_to_json(f64::from(*v)),
        SqlValue::F64(v) => float_to_json(*v),
        SqlValue::Bytes(b) => json!(hex::encode(b)),
        SqlValue::SqlList(items) => JsonValue::Array(items.iter().map(value_to_json).collect()),
        SqlValue::SqlMap(map) => JsonValue::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), value_to_json(v)))
                .collect(),
        ),
        SqlValue::SqlPoint(p) => json!({ "x": p.x, "y": p.y }),
        other => json!(other.to_string()),
    }
}

fn float_to_json(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or_else(|| json!(v.to_string()))
}

/// Formats the grid as CSV.
fn format_csv(grid: &Grid) -> String {
    let mut output = String::new();

    if !grid.labels.is_empty() {
        let header: Vec<String> = grid.labels.iter().map(|c| escape_csv(c)).collect();
        output.push_str(&header.join(","));
        output.push('\n');
    }

    for row in &grid.rows {
        let values: Vec<String> = row
            .iter()
            .map(|v| match v {
                SqlValue::Null => String::new(),
                other => escape_csv(&other.to_string()),
            })
            .collect();
        output.push_str(&values.join(","));
        output.push('\n');
    }

    output
}

/// Escapes a value for CSV output.
fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Formats the grid as raw tab-separated values.
fn format_raw(grid: &Grid) -> String {
    let mut output = String::new();

    if !grid.labels.is_empty() {
        output.push_str(&grid.labels.join("\t"));
        output.push('\n');
    }

    for row in &grid.rows {
        let values: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        output.push_str(&values.join("\t"));
        output.push('\n');
    }

    output
}
