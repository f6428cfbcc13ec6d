// src/error.rs

//! Unified error handling for the exporter.

use std::fmt;

use thiserror::Error;

/// Result type alias for exporter operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Caller supplied an unusable request
    #[error("{0}")]
    Input(String),

    /// An upstream service answered with something other than usable data
    #[error("{message}")]
    Upstream { service: String, message: String },

    /// The index held no usable capture rows
    #[error("{0}")]
    EmptyResult(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create an input error.
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    /// Create an upstream fetch error for the named service.
    pub fn upstream(service: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Upstream {
            service: service.into(),
            message: message.to_string(),
        }
    }

    /// Create an empty-result error.
    pub fn empty_result(message: impl Into<String>) -> Self {
        Self::EmptyResult(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error means "nothing archived" rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EmptyResult(_))
    }
}
