//! Utility functions and helpers.

pub mod http;
pub mod timestamp;
pub mod url;
