// src/models/mod.rs

//! Domain models for the exporter.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod bundle;
mod cdx;
mod config;
mod field;
mod record;

// Re-export all public types
pub use bundle::{ArchiveRequest, ExportBundle};
pub use cdx::{
    ArchiveQuery, CAPTURE_ROW_FIELDS, CaptureRow, CdxFetch, RawIndexResponse, ReadOutcome,
};
pub use config::{ArchiveConfig, Config, EmbedConfig, LoggingConfig};
pub use field::{ContentKind, FieldOption};
pub use record::{FieldValue, Record};
