// src/services/embed.rs

//! Live tweet enrichment through an oEmbed endpoint.
//!
//! Extraction from the embed markup is a best-effort pattern match. Any
//! failure (transport, status, missing fields, unexpected markup) yields
//! `None` so a single bad tweet never fails an export.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use crate::error::Result;
use crate::models::{ArchiveConfig, EmbedConfig};
use crate::utils::http::create_async_client;

static EMBED_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<blockquote class="twitter-tweet"(?: [^>]+)?><p[^>]*>(.*?)</p>.*?&mdash; (.*?)</a>"#,
    )
    .expect("valid embed regex")
});

static AUTHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(.*?)\s*\(.*$").expect("valid author regex"));

static ANCHOR_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<a[^>]*>|</a>").expect("valid anchor regex"));

static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>\s*").expect("valid line break regex"));

/// Text extracted from a tweet embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedResult {
    /// Tweet body
    pub text: Option<String>,
    /// Attribution line, e.g. `jack (@jack), March 21, 2006`
    pub info: Option<String>,
    /// `None` when the author could not be read from the attribution
    pub is_retweet: Option<bool>,
}

/// Source of live tweet content.
#[async_trait]
pub trait EmbedFetcher: Send + Sync {
    /// Look up a single tweet. Never fails; `None` means no enrichment.
    async fn fetch(&self, tweet_url: &str) -> Option<EmbedResult>;
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    html: Option<String>,
    author_name: Option<String>,
}

/// oEmbed-backed [`EmbedFetcher`].
#[derive(Debug, Clone)]
pub struct OEmbedClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl OEmbedClient {
    /// Create a client with its own HTTP connection pool.
    pub fn new(archive: &ArchiveConfig, embed: &EmbedConfig) -> Result<Self> {
        Ok(Self::with_client(create_async_client(archive)?, embed))
    }

    /// Create a client sharing an existing HTTP client.
    pub fn with_client(client: Client, embed: &EmbedConfig) -> Self {
        Self {
            client,
            endpoint: embed.oembed_endpoint.clone(),
            timeout: Duration::from_secs(embed.timeout_secs),
        }
    }

    async fn lookup(&self, tweet_url: &str) -> Option<OEmbedResponse> {
        let url = url::Url::parse_with_params(&self.endpoint, &[("url", tweet_url)]).ok()?;
        let response = match self.client.get(url).timeout(self.timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                log::debug!("Embed lookup failed for {}: {}", tweet_url, e);
                return None;
            }
        };
        if !response.status().is_success() {
            log::debug!(
                "Embed lookup for {} responded with {}",
                tweet_url,
                response.status()
            );
            return None;
        }
        let body = response.text().await.ok()?;
        serde_json::from_str(&body).ok()
    }

    /// Raw embed markup for a tweet, as returned by the endpoint.
    pub async fn fetch_embed_html(&self, tweet_url: &str) -> Option<String> {
        self.lookup(tweet_url)
            .await?
            .html
            .filter(|html| !html.is_empty())
    }
}

#[async_trait]
impl EmbedFetcher for OEmbedClient {
    async fn fetch(&self, tweet_url: &str) -> Option<EmbedResult> {
        let response = self.lookup(tweet_url).await?;
        let html = response.html.filter(|h| !h.is_empty())?;
        let author_name = response.author_name.filter(|a| !a.is_empty())?;
        parse_embed_html(&html, &author_name)
    }
}

/// Extract tweet text, attribution and retweet signal from embed markup.
pub fn parse_embed_html(html: &str, author_name: &str) -> Option<EmbedResult> {
    let caps = EMBED_CONTENT.captures(html)?;

    // Line breaks become newlines before tag stripping would drop them.
    let text = LINE_BREAK.replace_all(&caps[1], "\n");
    let text = sanitize_html_text(&text).trim().to_string();

    let info = sanitize_html_text(&caps[2])
        .replacen(')', "), ", 1)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let author = AUTHOR
        .captures(&info)
        .and_then(|c| c.get(1))
        .map_or("", |m| m.as_str());

    let is_retweet = if author.is_empty() {
        None
    } else {
        Some(author_name != author)
    };

    Some(EmbedResult {
        text: Some(text).filter(|t| !t.is_empty()),
        is_retweet,
        info: Some(info).filter(|i| !i.is_empty()),
    })
}

/// Strip tags and unescape the common entities.
fn sanitize_html_text(value: &str) -> String {
    let without_anchors = ANCHOR_TAG.replace_all(value, "");
    ANY_TAG
        .replace_all(&without_anchors, "")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
