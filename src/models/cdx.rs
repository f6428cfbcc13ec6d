//! Index-service (CDX) request and response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of fields in a well-formed capture row.
pub const CAPTURE_ROW_FIELDS: usize = 7;

/// Raw JSON rows as returned by the index service: a header row, capture
/// rows, and optionally a short pagination trailer.
pub type RawIndexResponse = Vec<Vec<Value>>;

/// One capture row:
/// `[urlkey, timestamp, original, mimetype, statuscode, digest, length]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRow {
    pub urlkey: String,
    pub timestamp: String,
    pub original: String,
    pub mimetype: String,
    pub statuscode: String,
    pub digest: String,
    pub length: String,
}

impl CaptureRow {
    /// Build a row from raw cells. Returns `None` for short (malformed) rows.
    ///
    /// Non-string cells are stringified so numeric columns survive.
    pub fn from_cells(cells: &[Value]) -> Option<Self> {
        if cells.len() < CAPTURE_ROW_FIELDS {
            return None;
        }
        let cell = |i: usize| match &cells[i] {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        Some(Self {
            urlkey: cell(0),
            timestamp: cell(1),
            original: cell(2),
            mimetype: cell(3),
            statuscode: cell(4),
            digest: cell(5),
            length: cell(6),
        })
    }
}

/// Result of reading a raw index response.
#[derive(Debug, Clone, Default)]
pub struct ReadOutcome {
    /// Well-formed capture rows, in upstream order
    pub rows: Vec<CaptureRow>,
    /// Continuation token split off the trailer row, if any
    pub resumption_key: Option<String>,
}

/// Parameters for one index-service query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveQuery {
    pub username: String,
    pub collapse: Option<String>,
    pub match_type: Option<String>,
    pub timestamp_from: Option<String>,
    pub timestamp_to: Option<String>,
    pub limit: Option<u64>,
    pub resumption_key: Option<String>,
}

/// Rows fetched from the index service together with the pagination flag
/// that was sent.
#[derive(Debug, Clone)]
pub struct CdxFetch {
    pub rows: RawIndexResponse,
    pub show_resume_key: bool,
}
