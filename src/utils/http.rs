// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use crate::error::{AppError, Result};
use crate::models::ArchiveConfig;

/// Create a configured asynchronous HTTP client.
///
/// Every request carries the configured User-Agent and asks for JSON.
pub fn create_async_client(config: &ArchiveConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch a URL and return its body, failing on non-2xx statuses.
pub async fn fetch_text(client: &reqwest::Client, url: &str, service: &str) -> Result<String> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::upstream(
            service,
            format!("{} responded with {}", service, status.as_u16()),
        ));
    }
    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_async_client() {
        assert!(create_async_client(&ArchiveConfig::default()).is_ok());
    }
}
