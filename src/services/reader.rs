// src/services/reader.rs

//! Raw index response reading.

use crate::error::{AppError, Result};
use crate::models::{CAPTURE_ROW_FIELDS, CaptureRow, ContentKind, RawIndexResponse, ReadOutcome};

/// Split a raw index payload into capture rows and an optional resumption key.
///
/// The first row is the header. When `show_resume_key` is set, a short last
/// row whose first cell is a string is the pagination trailer. Remaining
/// rows shorter than seven fields are dropped.
pub fn read_response(
    payload: &RawIndexResponse,
    show_resume_key: bool,
    kind: ContentKind,
) -> Result<ReadOutcome> {
    let Some((_header, rows)) = payload.split_first() else {
        return Err(AppError::empty_result(kind.empty_message()));
    };
    if rows.is_empty() {
        return Err(AppError::empty_result(kind.empty_message()));
    }

    let mut data_rows = rows;
    let mut resumption_key = None;

    if show_resume_key {
        if let Some((last, rest)) = rows.split_last() {
            if last.len() < CAPTURE_ROW_FIELDS {
                if let Some(key) = last.first().and_then(|cell| cell.as_str()) {
                    resumption_key = Some(key.to_string());
                    data_rows = rest;
                }
            }
        }
    }

    let valid: Vec<CaptureRow> = data_rows
        .iter()
        .filter_map(|cells| CaptureRow::from_cells(cells))
        .collect();

    let dropped = data_rows.len() - valid.len();
    if dropped > 0 {
        log::debug!("Dropped {} malformed index rows", dropped);
    }

    if valid.is_empty() {
        return Err(AppError::empty_result(kind.empty_message()));
    }

    Ok(ReadOutcome {
        rows: valid,
        resumption_key,
    })
}
