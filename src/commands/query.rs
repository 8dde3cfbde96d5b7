use crate::data::Dataset;
use crate::error::Result;
use crate::storage;
use rusqlite::Connection;
use rusqlite::types::Value;
use std::io::{self, Write};

pub const DEFAULT_PRECISION: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryOptions {
    /// Decimal places for REAL columns in the tab-separated output
    pub precision: usize,
    pub json: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions {
            precision: DEFAULT_PRECISION,
            json: false,
        }
    }
}

pub fn run(dataset: &Dataset, sql: &str, options: QueryOptions) -> Result<()> {
    let conn = storage::open_in_memory(dataset)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_query(&conn, sql, options, &mut out)
}

/// Run `sql` and print the rows, tab-separated with a header line or as a
/// JSON array of objects keyed by column name.
pub fn write_query<W: Write>(
    conn: &Connection,
    sql: &str,
    options: QueryOptions,
    out: &mut W,
) -> Result<()> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();

    let rows = stmt
        .query_map([], |row| {
            (0..width)
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    tracing::debug!(rows = rows.len(), columns = width, "query finished");

    if options.json {
        write_json(&columns, &rows, out)
    } else {
        write_tsv(&columns, &rows, options.precision, out)
    }
}

fn write_tsv<W: Write>(
    columns: &[String],
    rows: &[Vec<Value>],
    precision: usize,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "{}", columns.join("\t"))?;
    for row in rows {
        let cells: Vec<String> = row.iter().map(|v| tsv_cell(v, precision)).collect();
        writeln!(out, "{}", cells.join("\t"))?;
    }
    Ok(())
}

fn tsv_cell(value: &Value, precision: usize) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => format!("{:.*}", precision, f),
        // Keep one row per line and one cell per column
        Value::Text(s) => s.replace(['\t', '\n', '\r'], " "),
        Value::Blob(b) => format!("<blob {} bytes>", b.len()),
    }
}

fn write_json<W: Write>(columns: &[String], rows: &[Vec<Value>], out: &mut W) -> Result<()> {
    let objects: Vec<serde_json::Map<String, serde_json::Value>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .cloned()
                .zip(row.iter().map(json_cell))
                .collect()
        })
        .collect();
    serde_json::to_writer_pretty(&mut *out, &objects)?;
    writeln!(out)?;
    Ok(())
}

fn json_cell(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Real(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Blob(b) => serde_json::Value::String(format!("<blob {} bytes>", b.len())),
    }
}
