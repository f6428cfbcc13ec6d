// src/services/cdx.rs

//! Index-service (CDX) client.
//!
//! Builds the capture query for a username and returns the raw JSON rows.

use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{ArchiveConfig, ArchiveQuery, CdxFetch, ContentKind, RawIndexResponse};
use crate::utils::http::{create_async_client, fetch_text};
use crate::utils::timestamp::normalize_query_date;

const SERVICE: &str = "Archive service";
const NO_DATA: &str = "No data returned by the archive service.";

/// Client for the capture index.
#[derive(Debug, Clone)]
pub struct CdxClient {
    client: Client,
    endpoint: String,
}

impl CdxClient {
    /// Create a client with its own HTTP connection pool.
    pub fn new(config: &ArchiveConfig) -> Result<Self> {
        Ok(Self::with_client(create_async_client(config)?, config))
    }

    /// Create a client sharing an existing HTTP client.
    pub fn with_client(client: Client, config: &ArchiveConfig) -> Self {
        Self {
            client,
            endpoint: config.cdx_endpoint.clone(),
        }
    }

    /// Build the full query URL for `query`.
    ///
    /// Returns the URL and whether a resumption key was asked for.
    pub fn query_url(&self, kind: ContentKind, query: &ArchiveQuery) -> Result<(Url, bool)> {
        let wildcard = if query.match_type.is_some() { "" } else { "/*" };
        let pattern = match kind {
            ContentKind::Tweet => {
                format!("https://twitter.com/{}/status{}", query.username, wildcard)
            }
            ContentKind::Post => format!("instagram.com/{}{}", query.username, wildcard),
        };

        let mut url = Url::parse(&self.endpoint)?;
        let show_resume_key = query.limit.is_some_and(|l| l > 0);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("url", &pattern);
            pairs.append_pair("output", "json");

            if let Some(collapse) = &query.collapse {
                pairs.append_pair("collapse", collapse);
            }
            if let Some(from) = query
                .timestamp_from
                .as_deref()
                .and_then(|d| normalize_query_date(d, false))
            {
                pairs.append_pair("from", &from);
            }
            if let Some(to) = query
                .timestamp_to
                .as_deref()
                .and_then(|d| normalize_query_date(d, true))
            {
                pairs.append_pair("to", &to);
            }
            if let Some(limit) = query.limit.filter(|l| *l > 0) {
                pairs.append_pair("limit", &limit.to_string());
            }
            if let Some(key) = &query.resumption_key {
                pairs.append_pair("resumptionKey", key);
            }
            if let Some(match_type) = &query.match_type {
                pairs.append_pair("matchType", match_type);
            }
            if show_resume_key {
                pairs.append_pair("showResumeKey", "true");
            }
            if kind == ContentKind::Post {
                pairs.append_pair("filter", "statuscode:200");
            }
        }

        Ok((url, show_resume_key))
    }

    /// Run the query and return the raw rows.
    pub async fn fetch(&self, kind: ContentKind, query: &ArchiveQuery) -> Result<CdxFetch> {
        let (url, show_resume_key) = self.query_url(kind, query)?;
        log::debug!("Querying index: {}", url);

        let body = fetch_text(&self.client, url.as_str(), SERVICE).await?;
        let rows = parse_index_body(&body)?;
        log::info!("Index returned {} rows for {}", rows.len(), query.username);

        Ok(CdxFetch {
            rows,
            show_resume_key,
        })
    }
}

/// Parse an index response body into rows.
///
/// An empty body, a non-array body or an empty array is an upstream failure.
/// Array elements that are not arrays become empty rows, which the reader
/// discards as malformed.
pub fn parse_index_body(body: &str) -> Result<RawIndexResponse> {
    if body.trim().is_empty() {
        return Err(AppError::upstream(SERVICE, NO_DATA));
    }
    let value: Value =
        serde_json::from_str(body).map_err(|_| AppError::upstream(SERVICE, NO_DATA))?;
    let Value::Array(items) = value else {
        return Err(AppError::upstream(SERVICE, NO_DATA));
    };
    if items.is_empty() {
        return Err(AppError::upstream(SERVICE, NO_DATA));
    }

    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::Array(cells) => cells,
            _ => Vec::new(),
        })
        .collect())
}
