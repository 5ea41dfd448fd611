// crates/rhem-cli/src/output.rs
//
// Output formatting utilities for the RHEM CLI.
// Supports table and JSON output modes, and renders base-unit amounts as RHEM.

use serde::Serialize;
use tabled::{Table, Tabled};

use rhem_economics::Rhem;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// Render a base-unit amount field (a decimal string) as RHEM.
pub fn rhem(value: &serde_json::Value) -> String {
    match value.as_str().and_then(|s| s.parse::<u128>().ok()) {
        Some(units) => Rhem(units).to_string(),
        None => value.to_string(),
    }
}

/// Render a plain field without JSON quoting.
pub fn text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

/// Print `result` as JSON, or as a two-column key/value table.
pub fn print_fields(format: OutputFormat, result: &serde_json::Value, fields: &[(&str, String)]) {
    match format {
        OutputFormat::Json => println!("{}", format_json(result)),
        OutputFormat::Table => {
            let rows: Vec<FieldRow> = fields
                .iter()
                .map(|(name, value)| FieldRow {
                    field: name.to_string(),
                    value: value.clone(),
                })
                .collect();
            println!("{}", format_table(&rows));
        }
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}
