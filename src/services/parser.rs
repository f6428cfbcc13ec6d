// src/services/parser.rs

//! Capture row parsing.
//!
//! Turns one [`CaptureRow`] into a sparse [`Record`] holding only the
//! requested fields. Null-filling to a uniform shape happens at export.

use crate::models::{CaptureRow, ContentKind, FieldOption, FieldValue, Record};
use crate::services::embed::{EmbedFetcher, EmbedResult};
use crate::services::pool::map_ordered;
use crate::utils::timestamp;
use crate::utils::url::{
    CanonicalUrls, canonicalize_post, canonicalize_tweet, escape_semicolons, is_single_status,
};

const ENRICHMENT_FIELDS: [FieldOption; 3] = [
    FieldOption::AvailableTweetText,
    FieldOption::AvailableTweetIsRt,
    FieldOption::AvailableTweetInfo,
];

/// Parses capture rows for one query.
pub struct RowParser<'a> {
    kind: ContentKind,
    username: &'a str,
    fields: &'a [FieldOption],
    snapshot_prefix: &'a str,
    embed: Option<&'a dyn EmbedFetcher>,
}

impl<'a> RowParser<'a> {
    pub fn new(
        kind: ContentKind,
        username: &'a str,
        fields: &'a [FieldOption],
        snapshot_prefix: &'a str,
    ) -> Self {
        Self {
            kind,
            username,
            fields,
            snapshot_prefix,
            embed: None,
        }
    }

    /// Attach the enrichment source used for tweet rows.
    pub fn with_embed(mut self, embed: &'a dyn EmbedFetcher) -> Self {
        self.embed = Some(embed);
        self
    }

    /// Parse every row, keeping input order.
    ///
    /// Tweet rows go through the bounded pool because enrichment makes a
    /// network call per row; post rows are mapped in place. The resumption
    /// key lands on the first record only, and only if it was requested.
    pub async fn parse_all(
        &self,
        rows: Vec<CaptureRow>,
        resumption_key: Option<&str>,
        workers: usize,
    ) -> Vec<Record> {
        let mut records = if self.needs_enrichment() {
            map_ordered(rows, workers, |_, row| async move { self.parse(&row).await }).await
        } else {
            rows.iter().map(|row| self.parse_offline(row)).collect()
        };

        if let (Some(key), Some(first)) = (resumption_key, records.first_mut()) {
            if self.wants(FieldOption::ResumptionKey) {
                first.insert(FieldOption::ResumptionKey, key);
            }
        }
        records
    }

    /// Parse a single row, enriching it when it names exactly one tweet.
    pub async fn parse(&self, row: &CaptureRow) -> Record {
        let urls = self.canonicalize(row);
        let embed = match self.embed {
            Some(embed) if self.needs_enrichment() && is_single_status(&urls.parsed) => {
                let result = embed.fetch(&urls.parsed).await;
                if result.is_none() {
                    log::debug!("No embed data for {}", urls.parsed);
                }
                result
            }
            _ => None,
        };
        self.build(row, &urls, embed)
    }

    /// Parse a single row without any network lookup.
    pub fn parse_offline(&self, row: &CaptureRow) -> Record {
        let urls = self.canonicalize(row);
        self.build(row, &urls, None)
    }

    fn canonicalize(&self, row: &CaptureRow) -> CanonicalUrls {
        match self.kind {
            ContentKind::Tweet => canonicalize_tweet(
                &row.original,
                &row.timestamp,
                self.username,
                self.snapshot_prefix,
            ),
            ContentKind::Post => {
                canonicalize_post(&row.original, &row.timestamp, self.snapshot_prefix)
            }
        }
    }

    fn needs_enrichment(&self) -> bool {
        self.kind.is_enriched()
            && self.embed.is_some()
            && ENRICHMENT_FIELDS.iter().any(|f| self.wants(*f))
    }

    fn wants(&self, field: FieldOption) -> bool {
        self.fields.contains(&field)
    }

    fn build(&self, row: &CaptureRow, urls: &CanonicalUrls, embed: Option<EmbedResult>) -> Record {
        let (archived, parsed_archived, original, parsed) = match self.kind {
            ContentKind::Tweet => (
                FieldOption::ArchivedTweetUrl,
                FieldOption::ParsedArchivedTweetUrl,
                FieldOption::OriginalTweetUrl,
                FieldOption::ParsedTweetUrl,
            ),
            ContentKind::Post => (
                FieldOption::ArchivedPostUrl,
                FieldOption::ParsedArchivedPostUrl,
                FieldOption::OriginalPostUrl,
                FieldOption::ParsedPostUrl,
            ),
        };

        let mut values: Vec<(FieldOption, FieldValue)> = vec![
            (FieldOption::ArchivedUrlkey, FieldValue::from(row.urlkey.as_str())),
            (FieldOption::ArchivedTimestamp, FieldValue::from(row.timestamp.as_str())),
            (
                FieldOption::ParsedArchivedTimestamp,
                FieldValue::from(timestamp::normalize(&row.timestamp)),
            ),
            (archived, FieldValue::from(urls.archived.as_str())),
            (parsed_archived, FieldValue::from(urls.parsed_archived.as_str())),
            (original, FieldValue::from(urls.original.as_str())),
            (parsed, FieldValue::from(urls.parsed.as_str())),
        ];

        if self.kind.is_enriched() {
            let embed = embed.unwrap_or(EmbedResult {
                text: None,
                info: None,
                is_retweet: None,
            });
            let text = embed.text.as_deref().map(escape_semicolons);
            let info = embed.info.as_deref().map(escape_semicolons);
            values.push((FieldOption::AvailableTweetText, FieldValue::from(text)));
            values.push((FieldOption::AvailableTweetIsRt, FieldValue::from(embed.is_retweet)));
            values.push((FieldOption::AvailableTweetInfo, FieldValue::from(info)));
        }

        values.push((FieldOption::ArchivedMimetype, FieldValue::from(row.mimetype.as_str())));
        values.push((FieldOption::ArchivedStatuscode, FieldValue::from(row.statuscode.as_str())));
        values.push((FieldOption::ArchivedDigest, FieldValue::from(row.digest.as_str())));
        values.push((FieldOption::ArchivedLength, FieldValue::from(row.length.as_str())));

        let mut record = Record::new();
        for (field, value) in values {
            if self.wants(field) {
                record.insert(field, value);
            }
        }
        record
    }
}
