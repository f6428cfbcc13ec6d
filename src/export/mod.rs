// src/export/mod.rs

//! Field projection and export rendering.
//!
//! Parsed records are sparse; projection gives every record the same keys
//! in the caller's order so the tabular formats line up.

mod csv;
mod html;

use chrono::{Local, NaiveDateTime};

use crate::error::Result;
use crate::models::{ContentKind, ExportBundle, FieldOption, FieldValue, Record};

pub use self::csv::{build_csv, format_cell};
pub use self::html::build_html;

/// Drop repeated field options, keeping first-seen order.
pub fn unique_fields(fields: &[FieldOption]) -> Vec<FieldOption> {
    let mut columns = Vec::with_capacity(fields.len());
    for field in fields {
        if !columns.contains(field) {
            columns.push(*field);
        }
    }
    columns
}

/// Give every record exactly `columns`, null-filling absent values.
pub fn project(records: &[Record], columns: &[FieldOption]) -> Vec<Record> {
    records
        .iter()
        .map(|record| {
            let mut projected = Record::new();
            for column in columns {
                let value = record.get(*column).cloned().unwrap_or(FieldValue::Null);
                projected.insert(*column, value);
            }
            projected
        })
        .collect()
}

/// Serialize projected records as pretty-printed JSON.
pub fn build_json(records: &[Record]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// `<username>_tweets_<YYYYMMDDHHMMSS>` at the current local time.
pub fn build_filename(username: &str) -> String {
    build_filename_at(username, Local::now().naive_local())
}

/// As [`build_filename`], at a fixed time.
///
/// Characters outside `[A-Za-z0-9._-]` become `_`, so the name is always a
/// single path component.
pub fn build_filename_at(username: &str, at: NaiveDateTime) -> String {
    let safe: String = username
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_tweets_{}", safe, at.format("%Y%m%d%H%M%S"))
}

/// Parsed rows for one query, ready to export.
#[derive(Debug, Clone)]
pub struct ParsedResult {
    pub kind: ContentKind,
    pub username: String,
    pub records: Vec<Record>,
    pub show_resume_key: bool,
    pub resumption_key: Option<String>,
}

/// Project the records and render every export format.
pub fn build_export_bundle(result: ParsedResult, fields: &[FieldOption]) -> Result<ExportBundle> {
    let columns = unique_fields(fields);
    let records = project(&result.records, &columns);

    let csv = build_csv(&records, &columns);
    let json = build_json(&records)?;
    let html = build_html(result.kind, &result.username, &records, &columns);
    let filename = build_filename(&result.username);

    Ok(ExportBundle {
        kind: result.kind,
        total: records.len(),
        records,
        username: result.username,
        show_resume_key: result.show_resume_key,
        resumption_key: result.resumption_key,
        filename,
        csv,
        json,
        html,
    })
}
