//! Pipeline entry points.
//!
//! - `run_export`: query the index for a username and export the captures
//! - `export_from_fetch`: export rows that were fetched elsewhere

pub mod export;

pub use export::{export_from_fetch, run_export};
