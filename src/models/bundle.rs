//! Caller-facing request and export bundle.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::cdx::ArchiveQuery;
use super::field::ContentKind;
use super::record::Record;
use crate::error::{AppError, Result};

/// A query as supplied by the caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRequest {
    /// Checked by [`ArchiveRequest::to_query`], so a missing value is not a
    /// parse failure
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub timestamp_from: Option<String>,
    #[serde(default)]
    pub timestamp_to: Option<String>,
    /// A number or numeric text; fractions are truncated
    #[serde(default, deserialize_with = "deserialize_limit")]
    pub limit: Option<i64>,
    /// Collapse captures of the same URL key
    #[serde(default)]
    pub unique: bool,
    /// Continue a previous paginated query
    #[serde(default)]
    pub resumption_key: Option<String>,
}

impl ArchiveRequest {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    /// Validate the request and turn it into an index-service query.
    pub fn to_query(&self) -> Result<ArchiveQuery> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(AppError::input("Username is required."));
        }

        let limit = self.limit.filter(|l| *l > 0).map(|l| l as u64);
        let (collapse, match_type) = if self.unique {
            (Some("urlkey".to_string()), Some("prefix".to_string()))
        } else {
            (None, None)
        };

        Ok(ArchiveQuery {
            username: username.to_string(),
            collapse,
            match_type,
            timestamp_from: non_blank(&self.timestamp_from),
            timestamp_to: non_blank(&self.timestamp_to),
            limit,
            resumption_key: non_blank(&self.resumption_key),
        })
    }
}

const INVALID_LIMIT: &str = "Limit must be a number.";

fn deserialize_limit<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))),
        Some(Value::String(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<i64>()
                .ok()
                .or_else(|| {
                    text.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f as i64)
                })
                .map(Some)
                .ok_or_else(|| D::Error::custom(INVALID_LIMIT))
        }
        Some(_) => Err(D::Error::custom(INVALID_LIMIT)),
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Everything produced for one query. Built once, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct ExportBundle {
    pub kind: ContentKind,
    pub records: Vec<Record>,
    pub total: usize,
    pub username: String,
    pub show_resume_key: bool,
    pub resumption_key: Option<String>,
    pub filename: String,
    pub csv: String,
    pub json: String,
    pub html: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_query_requires_username() {
        let err = ArchiveRequest::new("   ").to_query().unwrap_err();
        assert_eq!(err.to_string(), "Username is required.");
    }

    #[test]
    fn test_to_query_unique_maps_to_collapse_and_prefix() {
        let request = ArchiveRequest {
            unique: true,
            ..ArchiveRequest::new(" jack ")
        };
        let query = request.to_query().unwrap();
        assert_eq!(query.username, "jack");
        assert_eq!(query.collapse.as_deref(), Some("urlkey"));
        assert_eq!(query.match_type.as_deref(), Some("prefix"));
    }

    #[test]
    fn test_to_query_drops_non_positive_limit() {
        let request = ArchiveRequest {
            limit: Some(0),
            timestamp_from: Some("".to_string()),
            ..ArchiveRequest::new("jack")
        };
        let query = request.to_query().unwrap();
        assert_eq!(query.limit, None);
        assert_eq!(query.timestamp_from, None);
    }

    #[test]
    fn test_missing_username_reaches_validation() {
        let request: ArchiveRequest = serde_json::from_str("{}").unwrap();
        let err = request.to_query().unwrap_err();
        assert!(matches!(err, AppError::Input(_)));
        assert_eq!(err.to_string(), "Username is required.");
    }

    #[test]
    fn test_limit_accepts_numeric_text() {
        let request: ArchiveRequest =
            serde_json::from_value(serde_json::json!({"username": "jack", "limit": " 50 "}))
                .unwrap();
        assert_eq!(request.limit, Some(50));
        assert_eq!(request.to_query().unwrap().limit, Some(50));

        let request: ArchiveRequest =
            serde_json::from_value(serde_json::json!({"username": "jack", "limit": 12.7}))
                .unwrap();
        assert_eq!(request.limit, Some(12));

        for blank in [serde_json::json!(""), serde_json::Value::Null] {
            let request: ArchiveRequest =
                serde_json::from_value(serde_json::json!({"username": "jack", "limit": blank}))
                    .unwrap();
            assert_eq!(request.limit, None);
        }
    }

    #[test]
    fn test_limit_rejects_non_numbers() {
        for bad in [serde_json::json!("fifty"), serde_json::json!(true), serde_json::json!([5])] {
            let err = serde_json::from_value::<ArchiveRequest>(
                serde_json::json!({"username": "jack", "limit": bad}),
            )
            .unwrap_err();
            assert_eq!(err.to_string(), "Limit must be a number.");
        }
    }

    #[test]
    fn test_flattened_event_keeps_lenient_fields() {
        #[derive(Deserialize)]
        struct Event {
            #[serde(flatten)]
            request: ArchiveRequest,
            kind: Option<ContentKind>,
        }

        let event: Event =
            serde_json::from_value(serde_json::json!({"limit": "7", "kind": "post"})).unwrap();
        assert_eq!(event.request.limit, Some(7));
        assert_eq!(event.kind, Some(ContentKind::Post));
        assert_eq!(
            event.request.to_query().unwrap_err().to_string(),
            "Username is required."
        );
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let request: ArchiveRequest = serde_json::from_str(
            r#"{"username":"jack","timestampFrom":"2020-01-01","limit":50,"unique":true}"#,
        )
        .unwrap();
        assert_eq!(request.timestamp_from.as_deref(), Some("2020-01-01"));
        assert_eq!(request.limit, Some(50));
        assert!(request.unique);
    }
}
