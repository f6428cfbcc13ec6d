//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Index-service settings
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Embed (enrichment) lookup settings
    #[serde(default)]
    pub embed: EmbedConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("cannot read {}: {}", path.display(), e)))?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.archive.user_agent.trim().is_empty() {
            return Err(AppError::validation("archive.user_agent is empty"));
        }
        if self.archive.cdx_endpoint.trim().is_empty() {
            return Err(AppError::validation("archive.cdx_endpoint is empty"));
        }
        if self.archive.snapshot_prefix.trim().is_empty() {
            return Err(AppError::validation("archive.snapshot_prefix is empty"));
        }
        if self.archive.timeout_secs == 0 {
            return Err(AppError::validation("archive.timeout_secs must be > 0"));
        }
        if self.embed.oembed_endpoint.trim().is_empty() {
            return Err(AppError::validation("embed.oembed_endpoint is empty"));
        }
        if self.embed.timeout_secs == 0 {
            return Err(AppError::validation("embed.timeout_secs must be > 0"));
        }
        if self.embed.max_concurrent == 0 {
            return Err(AppError::validation("embed.max_concurrent must be > 0"));
        }
        url::Url::parse(&self.archive.cdx_endpoint)?;
        url::Url::parse(&self.embed.oembed_endpoint)?;
        Ok(())
    }
}

/// Index-service client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// CDX search endpoint
    #[serde(default = "defaults::cdx_endpoint")]
    pub cdx_endpoint: String,

    /// Prefix of archived snapshot URLs (`<prefix>/<timestamp>/<url>`)
    #[serde(default = "defaults::snapshot_prefix")]
    pub snapshot_prefix: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            cdx_endpoint: defaults::cdx_endpoint(),
            snapshot_prefix: defaults::snapshot_prefix(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Embed lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// oEmbed endpoint queried with `?url=<tweet url>`
    #[serde(default = "defaults::oembed_endpoint")]
    pub oembed_endpoint: String,

    /// Number of lookups in flight at once
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Per-lookup timeout in seconds
    #[serde(default = "defaults::embed_timeout")]
    pub timeout_secs: u64,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            oembed_endpoint: defaults::oembed_endpoint(),
            max_concurrent: defaults::max_concurrent(),
            timeout_secs: defaults::embed_timeout(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    pub fn cdx_endpoint() -> String {
        "https://web.archive.org/cdx/search/cdx".into()
    }
    pub fn snapshot_prefix() -> String {
        "https://web.archive.org/web".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn oembed_endpoint() -> String {
        "https://publish.twitter.com/oembed".into()
    }
    pub fn max_concurrent() -> usize {
        5
    }
    pub fn embed_timeout() -> u64 {
        10
    }
    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.archive.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.embed.max_concurrent = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_endpoint() {
        let mut config = Config::default();
        config.embed.oembed_endpoint = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[embed]\nmax_concurrent = 3\n").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.embed.max_concurrent, 3);
        assert_eq!(config.embed.timeout_secs, 10);
        assert_eq!(
            config.archive.cdx_endpoint,
            "https://web.archive.org/cdx/search/cdx"
        );
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = Config::load("/nonexistent/cdx-export.toml").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().starts_with("Configuration error: cannot read"));
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[embed\nmax_concurrent = ").unwrap();
        assert!(matches!(Config::load(file.path()), Err(AppError::Toml(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/cdx-export.toml");
        assert_eq!(config.embed.max_concurrent, 5);
        assert_eq!(config.logging.level, "info");
    }
}
