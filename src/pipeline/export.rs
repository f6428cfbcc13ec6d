// src/pipeline/export.rs

//! Query-to-export pipeline.

use std::time::Instant;

use crate::error::Result;
use crate::export::{ParsedResult, build_export_bundle};
use crate::models::{ArchiveRequest, CdxFetch, Config, ContentKind, ExportBundle, FieldOption};
use crate::services::{CdxClient, EmbedFetcher, OEmbedClient, RowParser, read_response};
use crate::utils::http::create_async_client;

/// Query the index for `request` and export the captures.
///
/// An empty `fields` list exports the kind's full vocabulary.
pub async fn run_export(
    config: &Config,
    request: &ArchiveRequest,
    fields: &[FieldOption],
    kind: ContentKind,
) -> Result<ExportBundle> {
    let start = Instant::now();
    let query = request.to_query()?;
    log::info!("Exporting archived {}s for {}", kind, query.username);

    let client = create_async_client(&config.archive)?;
    let cdx = CdxClient::with_client(client.clone(), &config.archive);
    let fetch = cdx.fetch(kind, &query).await?;

    let bundle = if kind.is_enriched() {
        let embed = OEmbedClient::with_client(client, &config.embed);
        export_from_fetch(config, kind, &query.username, fetch, fields, Some(&embed)).await?
    } else {
        export_from_fetch(config, kind, &query.username, fetch, fields, None).await?
    };

    log::info!(
        "Exported {} records for {} in {:.2?}",
        bundle.total,
        bundle.username,
        start.elapsed()
    );
    Ok(bundle)
}

/// Read, parse and export rows that were already fetched.
pub async fn export_from_fetch(
    config: &Config,
    kind: ContentKind,
    username: &str,
    fetch: CdxFetch,
    fields: &[FieldOption],
    embed: Option<&dyn EmbedFetcher>,
) -> Result<ExportBundle> {
    let fields = if fields.is_empty() {
        kind.field_options()
    } else {
        fields
    };

    let outcome = read_response(&fetch.rows, fetch.show_resume_key, kind)?;
    log::info!(
        "Parsing {} capture rows{}",
        outcome.rows.len(),
        if outcome.resumption_key.is_some() {
            " (more available)"
        } else {
            ""
        }
    );

    let mut parser = RowParser::new(kind, username, fields, &config.archive.snapshot_prefix);
    if let Some(embed) = embed {
        parser = parser.with_embed(embed);
    }
    let records = parser
        .parse_all(
            outcome.rows,
            outcome.resumption_key.as_deref(),
            config.embed.max_concurrent,
        )
        .await;

    build_export_bundle(
        ParsedResult {
            kind,
            username: username.to_string(),
            records,
            show_resume_key: fetch.show_resume_key,
            resumption_key: outcome.resumption_key,
        },
        fields,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn fetch(value: Value, show_resume_key: bool) -> CdxFetch {
        CdxFetch {
            rows: serde_json::from_value(value).unwrap(),
            show_resume_key,
        }
    }

    fn row(urlkey: &str, timestamp: &str, original: &str) -> Value {
        json!([urlkey, timestamp, original, "text/html", "200", "DIGEST", "100"])
    }

    #[tokio::test]
    async fn test_export_from_fetch_with_trailer() {
        let fetch = fetch(
            json!([
                ["urlkey", "timestamp", "original", "mimetype", "statuscode", "digest", "length"],
                row(
                    "com,twitter)/jack/status/20",
                    "20060321205000",
                    "https://twitter.com/jack/status/20"
                ),
                row(
                    "com,twitter)/jack/status/21",
                    "20060322",
                    "https://twitter.com/jack/status/21?s=20"
                ),
                [],
                ["NEXTPAGE", "extra"]
            ]),
            true,
        );
        let fields = [
            FieldOption::ParsedTweetUrl,
            FieldOption::ParsedArchivedTimestamp,
            FieldOption::ResumptionKey,
        ];

        let config = Config::default();
        let bundle = export_from_fetch(&config, ContentKind::Tweet, "jack", fetch, &fields, None)
            .await
            .unwrap();

        assert_eq!(bundle.total, 2);
        assert_eq!(bundle.resumption_key.as_deref(), Some("NEXTPAGE"));
        assert!(bundle.show_resume_key);
        assert_eq!(
            bundle.csv,
            "parsed_tweet_url,parsed_archived_timestamp,resumption_key\n\
             https://twitter.com/jack/status/20,\"2006/03/21, 20:50:00\",NEXTPAGE\n\
             https://twitter.com/jack/status/21,\"2006/03/22, 00:00:00\","
        );
    }

    #[tokio::test]
    async fn test_export_from_fetch_empty_is_not_found() {
        let fetch = fetch(json!([["urlkey", "timestamp"]]), false);
        let config = Config::default();
        let err = export_from_fetch(&config, ContentKind::Post, "someone", fetch, &[], None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "No archived Instagram posts found for this query."
        );
    }

    #[tokio::test]
    async fn test_empty_field_list_exports_full_vocabulary() {
        let fetch = fetch(
            json!([
                ["urlkey"],
                row(
                    "com,instagram)/someone/p/abc",
                    "20200101",
                    "https://instagram.com/p/abc/"
                )
            ]),
            false,
        );
        let config = Config::default();
        let bundle = export_from_fetch(&config, ContentKind::Post, "someone", fetch, &[], None)
            .await
            .unwrap();
        let keys: Vec<_> = bundle.records[0].keys().collect();
        assert_eq!(keys, ContentKind::Post.field_options().to_vec());
    }
}
