// Console rendering for scenario results

use anyhow::Result;
use colored::Colorize;
use querywrap_core::domain::Row;
use querywrap_core::AppError;
use serde_json::{Map, Value};
use tabled::builder::Builder;

/// Column labels of `SELECT * FROM users`, in table order
pub const USER_COLUMNS: &[&str] = &["id", "name", "email", "age", "created_at"];

/// Label for the column at `index`; positional when the caller gave none
fn column_label(columns: &[&str], index: usize) -> String {
    columns
        .get(index)
        .map(|c| c.to_string())
        .unwrap_or_else(|| format!("col{}", index + 1))
}

fn width(columns: &[&str], rows: &[Row]) -> usize {
    rows.iter().map(Row::len).fold(columns.len(), usize::max)
}

fn render_table(columns: &[&str], rows: &[Row]) -> String {
    let width = width(columns, rows);
    let mut builder = Builder::default();
    builder.push_record((0..width).map(|i| column_label(columns, i)));
    for row in rows {
        builder.push_record((0..width).map(|i| {
            row.get(i)
                .map(ToString::to_string)
                .unwrap_or_default()
        }));
    }
    builder.build().to_string()
}

fn json_records(columns: &[&str], rows: &[Row]) -> Result<Vec<Value>> {
    rows.iter()
        .map(|row| -> Result<Value> {
            let mut record = Map::new();
            for (i, value) in row.values().iter().enumerate() {
                record.insert(column_label(columns, i), serde_json::to_value(value)?);
            }
            Ok(Value::Object(record))
        })
        .collect()
}

pub struct Printer {
    json: bool,
}

impl Printer {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn heading(&self, title: &str) {
        println!();
        println!("{}", title.cyan().bold());
    }

    /// Print rows under the given column labels (extra values are numbered)
    pub fn rows(&self, columns: &[&str], rows: &[Row]) -> Result<()> {
        if self.json {
            let records = json_records(columns, rows)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        } else if rows.is_empty() {
            println!("  {}", "(no rows)".dimmed());
        } else {
            println!("{}", render_table(columns, rows));
        }
        Ok(())
    }

    pub fn affected(&self, count: u64) {
        println!("  {} {} row(s) affected", "✓".green(), count);
    }

    pub fn note(&self, message: &str) {
        println!("  {} {}", "•".blue(), message);
    }

    /// Caught, expected failure: printed as `kind: message`
    pub fn expected_error(&self, err: &AppError) {
        println!("  {} {}: {}", "✗".red(), err.kind().bold(), err);
    }
}
