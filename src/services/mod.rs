//! Service layer for the exporter.
//!
//! This module contains the stages between the index service and export:
//! - Index querying (`CdxClient`)
//! - Response reading and trailer splitting (`read_response`)
//! - Tweet enrichment (`OEmbedClient`, behind `EmbedFetcher`)
//! - Row parsing (`RowParser`) on an order-preserving worker pool

pub mod cdx;
pub mod embed;
pub mod parser;
pub mod pool;
pub mod reader;

pub use cdx::CdxClient;
pub use embed::{EmbedFetcher, EmbedResult, OEmbedClient, parse_embed_html};
pub use parser::RowParser;
pub use pool::map_ordered;
pub use reader::read_response;
