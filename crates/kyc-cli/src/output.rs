// crates/kyc-cli/src/output.rs
//
// Output formatting utilities for the KYC CLI.
// Supports table and JSON output modes.

use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

/// One labelled value in a detail table.
#[derive(Debug, Tabled)]
pub struct FieldRow {
    #[tabled(rename = "Field")]
    pub field: &'static str,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// Render selected fields of a JSON object as a two-column table.
/// Missing fields show as "-"; arrays are comma-joined.
pub fn format_fields(value: &serde_json::Value, fields: &[(&'static str, &str)]) -> String {
    let rows: Vec<FieldRow> = fields
        .iter()
        .map(|(label, key)| FieldRow {
            field: *label,
            value: render(&value[*key]),
        })
        .collect();
    format_table(&rows)
}

fn render(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "-".to_string(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(render)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
