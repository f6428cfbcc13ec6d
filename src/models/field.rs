//! Field-option vocabulary and content kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The kind of content a query targets.
///
/// Tweets are enriched with live embed data; Instagram posts are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[default]
    Tweet,
    Post,
}

impl ContentKind {
    /// Full field vocabulary for this kind, in canonical order.
    pub fn field_options(self) -> &'static [FieldOption] {
        match self {
            ContentKind::Tweet => TWEET_FIELDS,
            ContentKind::Post => POST_FIELDS,
        }
    }

    /// Whether rows of this kind are enriched through the embed endpoint.
    pub fn is_enriched(self) -> bool {
        matches!(self, ContentKind::Tweet)
    }

    /// Message used when a query returns nothing usable.
    pub fn empty_message(self) -> &'static str {
        match self {
            ContentKind::Tweet => "No archived tweets found for this query.",
            ContentKind::Post => "No archived Instagram posts found for this query.",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Tweet => "tweet",
            ContentKind::Post => "post",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tweet" | "tweets" | "twitter" => Ok(ContentKind::Tweet),
            "post" | "posts" | "instagram" => Ok(ContentKind::Post),
            other => Err(AppError::input(format!("Unknown content kind: {other}"))),
        }
    }
}

/// One output column. The serialized names are the public field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldOption {
    #[serde(rename = "archived_urlkey")]
    ArchivedUrlkey,
    #[serde(rename = "archived_timestamp")]
    ArchivedTimestamp,
    #[serde(rename = "parsed_archived_timestamp")]
    ParsedArchivedTimestamp,
    #[serde(rename = "archived_tweet_url")]
    ArchivedTweetUrl,
    #[serde(rename = "parsed_archived_tweet_url")]
    ParsedArchivedTweetUrl,
    #[serde(rename = "original_tweet_url")]
    OriginalTweetUrl,
    #[serde(rename = "parsed_tweet_url")]
    ParsedTweetUrl,
    #[serde(rename = "archived_post_url")]
    ArchivedPostUrl,
    #[serde(rename = "parsed_archived_post_url")]
    ParsedArchivedPostUrl,
    #[serde(rename = "original_post_url")]
    OriginalPostUrl,
    #[serde(rename = "parsed_post_url")]
    ParsedPostUrl,
    #[serde(rename = "available_tweet_text")]
    AvailableTweetText,
    #[serde(rename = "available_tweet_is_RT")]
    AvailableTweetIsRt,
    #[serde(rename = "available_tweet_info")]
    AvailableTweetInfo,
    #[serde(rename = "archived_mimetype")]
    ArchivedMimetype,
    #[serde(rename = "archived_statuscode")]
    ArchivedStatuscode,
    #[serde(rename = "archived_digest")]
    ArchivedDigest,
    #[serde(rename = "archived_length")]
    ArchivedLength,
    #[serde(rename = "resumption_key")]
    ResumptionKey,
}

const TWEET_FIELDS: &[FieldOption] = &[
    FieldOption::ArchivedUrlkey,
    FieldOption::ArchivedTimestamp,
    FieldOption::ParsedArchivedTimestamp,
    FieldOption::ArchivedTweetUrl,
    FieldOption::ParsedArchivedTweetUrl,
    FieldOption::OriginalTweetUrl,
    FieldOption::ParsedTweetUrl,
    FieldOption::AvailableTweetText,
    FieldOption::AvailableTweetIsRt,
    FieldOption::AvailableTweetInfo,
    FieldOption::ArchivedMimetype,
    FieldOption::ArchivedStatuscode,
    FieldOption::ArchivedDigest,
    FieldOption::ArchivedLength,
    FieldOption::ResumptionKey,
];

const POST_FIELDS: &[FieldOption] = &[
    FieldOption::ArchivedUrlkey,
    FieldOption::ArchivedTimestamp,
    FieldOption::ParsedArchivedTimestamp,
    FieldOption::ArchivedPostUrl,
    FieldOption::ParsedArchivedPostUrl,
    FieldOption::OriginalPostUrl,
    FieldOption::ParsedPostUrl,
    FieldOption::ArchivedMimetype,
    FieldOption::ArchivedStatuscode,
    FieldOption::ArchivedDigest,
    FieldOption::ArchivedLength,
    FieldOption::ResumptionKey,
];

const ALL_FIELDS: &[FieldOption] = &[
    FieldOption::ArchivedUrlkey,
    FieldOption::ArchivedTimestamp,
    FieldOption::ParsedArchivedTimestamp,
    FieldOption::ArchivedTweetUrl,
    FieldOption::ParsedArchivedTweetUrl,
    FieldOption::OriginalTweetUrl,
    FieldOption::ParsedTweetUrl,
    FieldOption::ArchivedPostUrl,
    FieldOption::ParsedArchivedPostUrl,
    FieldOption::OriginalPostUrl,
    FieldOption::ParsedPostUrl,
    FieldOption::AvailableTweetText,
    FieldOption::AvailableTweetIsRt,
    FieldOption::AvailableTweetInfo,
    FieldOption::ArchivedMimetype,
    FieldOption::ArchivedStatuscode,
    FieldOption::ArchivedDigest,
    FieldOption::ArchivedLength,
    FieldOption::ResumptionKey,
];

impl FieldOption {
    /// Public (wire) name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldOption::ArchivedUrlkey => "archived_urlkey",
            FieldOption::ArchivedTimestamp => "archived_timestamp",
            FieldOption::ParsedArchivedTimestamp => "parsed_archived_timestamp",
            FieldOption::ArchivedTweetUrl => "archived_tweet_url",
            FieldOption::ParsedArchivedTweetUrl => "parsed_archived_tweet_url",
            FieldOption::OriginalTweetUrl => "original_tweet_url",
            FieldOption::ParsedTweetUrl => "parsed_tweet_url",
            FieldOption::ArchivedPostUrl => "archived_post_url",
            FieldOption::ParsedArchivedPostUrl => "parsed_archived_post_url",
            FieldOption::OriginalPostUrl => "original_post_url",
            FieldOption::ParsedPostUrl => "parsed_post_url",
            FieldOption::AvailableTweetText => "available_tweet_text",
            FieldOption::AvailableTweetIsRt => "available_tweet_is_RT",
            FieldOption::AvailableTweetInfo => "available_tweet_info",
            FieldOption::ArchivedMimetype => "archived_mimetype",
            FieldOption::ArchivedStatuscode => "archived_statuscode",
            FieldOption::ArchivedDigest => "archived_digest",
            FieldOption::ArchivedLength => "archived_length",
            FieldOption::ResumptionKey => "resumption_key",
        }
    }

    /// Every field name across both kinds.
    pub fn all() -> &'static [FieldOption] {
        ALL_FIELDS
    }

    /// Parse a comma-separated list of field names.
    pub fn parse_list(list: &str) -> Result<Vec<FieldOption>, AppError> {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl fmt::Display for FieldOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldOption {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_FIELDS
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| AppError::input(format!("Unknown field option: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tweet_vocabulary_has_enrichment_fields() {
        let fields = ContentKind::Tweet.field_options();
        assert!(fields.contains(&FieldOption::AvailableTweetText));
        assert!(fields.contains(&FieldOption::AvailableTweetIsRt));
        assert_eq!(fields.first(), Some(&FieldOption::ArchivedUrlkey));
        assert_eq!(fields.last(), Some(&FieldOption::ResumptionKey));
    }

    #[test]
    fn test_post_vocabulary_has_no_enrichment_fields() {
        let fields = ContentKind::Post.field_options();
        assert!(!fields.contains(&FieldOption::AvailableTweetText));
        assert!(!fields.contains(&FieldOption::AvailableTweetInfo));
        assert!(fields.contains(&FieldOption::ParsedPostUrl));
    }

    #[test]
    fn test_field_name_matches_serde_name() {
        for field in FieldOption::all() {
            let json = serde_json::to_string(field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.as_str()));
            assert_eq!(field.as_str().parse::<FieldOption>().unwrap(), *field);
        }
    }

    #[test]
    fn test_parse_list() {
        let fields = FieldOption::parse_list("archived_timestamp, available_tweet_is_RT,").unwrap();
        assert_eq!(
            fields,
            vec![FieldOption::ArchivedTimestamp, FieldOption::AvailableTweetIsRt]
        );
        assert!(FieldOption::parse_list("archived_timestamp,bogus").is_err());
    }

    #[test]
    fn test_content_kind_from_str() {
        assert_eq!("Tweets".parse::<ContentKind>().unwrap(), ContentKind::Tweet);
        assert_eq!("instagram".parse::<ContentKind>().unwrap(), ContentKind::Post);
        assert!("video".parse::<ContentKind>().is_err());
    }
}
