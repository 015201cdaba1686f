//! Report formatting for the validate command.

use recval_core::report::ErrorItem;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

const VALUE_WIDTH: usize = 40;

/// Validation outcome of one input record, for JSON output.
#[derive(Debug, Serialize)]
pub struct RecordOutput<'a> {
    pub index: usize,
    pub valid: bool,
    pub errors: &'a [ErrorItem],
}

/// Row for the violations table.
#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "Record")]
    record: usize,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl ItemRow {
    fn new(record: usize, item: &ErrorItem) -> Self {
        Self {
            record,
            path: item.path().to_string(),
            key: item.validator_key().to_string(),
            kind: item.kind().to_string(),
            message: item.message().to_string(),
            value: truncate(&item.value().to_text(), VALUE_WIDTH),
        }
    }
}

/// Print violations of every record as a table.
pub fn print_items_table(reports: &[(usize, Vec<ErrorItem>)], total: usize) {
    let rows: Vec<ItemRow> = reports
        .iter()
        .flat_map(|(index, items)| items.iter().map(move |item| ItemRow::new(*index, item)))
        .collect();

    if rows.is_empty() {
        println!("OK   {total} record(s) valid");
        return;
    }

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!("\nFAIL {} of {} record(s) invalid, {} violation(s)", reports.len(), total, rows.len());
}

/// Print every record's outcome as JSON.
pub fn print_json(outputs: &[RecordOutput<'_>]) {
    match serde_json::to_string_pretty(outputs) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Failed to serialize report: {e}");
            std::process::exit(1);
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let head: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{head}...")
}
