// src/utils/url.rs

//! URL canonicalization for archived captures.
//!
//! Everything here is pure and never fails: malformed input falls back to
//! the raw string at each step.

use std::sync::LazyLock;

use regex::Regex;

static STATUS_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/status/(\d+)").expect("valid status regex"));

static TWITTER_STATUS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https://twitter\.com/([^/]+)/status/(\d+)").expect("valid twitter regex")
});

// Quoted or HTML-escaped quoted status segment, e.g. `/status/"<url>"`,
// `/status/&quot;<url>` or `/status/&quot%3B<url>`, each ending at `&` or end.
static QUOTED_STATUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"/status/(?:"([^"\n]*)"|&quot;([^&\n]*)(?:&|$)|&quot%3B([^&\n]*)(?:&|$))"#)
        .expect("valid quoted status regex")
});

static SCHEME_SLASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(https?:)/{2,}").expect("valid scheme regex"));

const TWITTER_ORIGIN: &str = "https://twitter.com";

/// The URL fields derived from one capture row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalUrls {
    /// Snapshot URL wrapping the decoded original
    pub archived: String,
    /// Snapshot URL wrapping the canonical original
    pub parsed_archived: String,
    /// The original URL as the index reported it
    pub original: String,
    /// The canonical original URL
    pub parsed: String,
}

/// Canonicalize a tweet capture.
///
/// `snapshot_prefix` is the archive's snapshot base, e.g.
/// `https://web.archive.org/web`.
pub fn canonicalize_tweet(
    original: &str,
    timestamp: &str,
    username: &str,
    snapshot_prefix: &str,
) -> CanonicalUrls {
    let decoded = percent_decode(original).replace('\u{2019}', "");
    let unquoted = strip_surrounding_quotes(&strip_quoted_status(&decoded));

    let archive_url = snapshot_url(snapshot_prefix, timestamp, &decoded);
    let cleaned = delete_tweet_pathnames(&clean_tweet_url(&unquoted, username));

    let adjusted = if has_double_status(&archive_url, &cleaned) {
        rebuild_double_status(&cleaned)
    } else if !cleaned.contains("://") {
        delete_tweet_pathnames(&ensure_https(&cleaned))
    } else {
        cleaned
    };

    let parsed_archive_url = snapshot_url(snapshot_prefix, timestamp, &adjusted);

    CanonicalUrls {
        archived: collapse_scheme_slashes(&escape_semicolons(&archive_url)),
        parsed_archived: collapse_scheme_slashes(&escape_semicolons(&parsed_archive_url)),
        original: collapse_scheme_slashes(&escape_semicolons(original)),
        parsed: collapse_scheme_slashes(&escape_semicolons(&adjusted)),
    }
}

/// Canonicalize an Instagram post capture: decode, drop query and
/// fragment, force `https://`.
pub fn canonicalize_post(original: &str, timestamp: &str, snapshot_prefix: &str) -> CanonicalUrls {
    let decoded = percent_decode(original);
    let cleaned = clean_post_url(&decoded);

    CanonicalUrls {
        archived: escape_semicolons(&snapshot_url(snapshot_prefix, timestamp, &decoded)),
        parsed_archived: escape_semicolons(&snapshot_url(snapshot_prefix, timestamp, &cleaned)),
        original: escape_semicolons(original),
        parsed: escape_semicolons(&cleaned),
    }
}

/// Build `<prefix>/<timestamp>/<url>`.
pub fn snapshot_url(prefix: &str, timestamp: &str, url: &str) -> String {
    format!("{}/{}/{}", prefix.trim_end_matches('/'), timestamp, url)
}

/// Percent-decode, returning the input unchanged when it is not valid
/// percent-encoding or does not decode to UTF-8.
pub fn percent_decode(value: &str) -> String {
    if has_malformed_escape(value) {
        return value.to_string();
    }
    urlencoding::decode(value)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

fn has_malformed_escape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !(i + 2 < bytes.len()
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit())
    })
}

/// Replace a value holding a quoted status segment with the quoted content.
pub fn strip_quoted_status(value: &str) -> String {
    let Some(caps) = QUOTED_STATUS.captures(value) else {
        return value.to_string();
    };
    let candidate = caps
        .get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map_or("", |m| m.as_str());
    decode_html_entities(candidate)
}

/// Decode the handful of entities that show up in captured URLs.
pub fn decode_html_entities(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

/// Trim leading and trailing `"` characters.
pub fn strip_surrounding_quotes(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Rewrite a status URL belonging to `username` into canonical form.
pub fn clean_tweet_url(url: &str, username: &str) -> String {
    let belongs_to_user = url.to_lowercase().contains(&username.to_lowercase());
    match STATUS_ID.captures(url) {
        Some(caps) if belongs_to_user => {
            format!("{TWITTER_ORIGIN}/{}/status/{}", username, &caps[1])
        }
        _ => url.to_string(),
    }
}

/// Reduce `https://twitter.com/<user>/status/<id>...` to exactly that triple.
pub fn delete_tweet_pathnames(url: &str) -> String {
    match TWITTER_STATUS_URL.captures(url) {
        Some(caps) => format!("{TWITTER_ORIGIN}/{}/status/{}", &caps[1], &caps[2]),
        None => url.to_string(),
    }
}

/// A snapshot URL with two status segments whose original is not a twitter URL.
pub fn has_double_status(archive_url: &str, original: &str) -> bool {
    archive_url.matches("/status/").count() == 2 && !original.contains("twitter.com")
}

/// Rebuild a double-status original as a single twitter status URL.
///
/// The original is treated as a bare path (any `scheme://host` is dropped).
/// A path holding two status segments keeps the text before the first one
/// together with the last `/status/<id>`.
fn rebuild_double_status(original: &str) -> String {
    let path = match original.find("://") {
        Some(idx) => {
            let rest = &original[idx + 3..];
            rest.find('/').map_or("", |slash| &rest[slash..])
        }
        None => original,
    };
    let mut path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    if path.matches("/status/").count() >= 2 {
        let first = path.find("/status/").unwrap_or(0);
        let collapsed = STATUS_ID
            .captures_iter(&path)
            .last()
            .map(|caps| format!("{}/status/{}", &path[..first], &caps[1]));
        if let Some(collapsed) = collapsed {
            path = collapsed;
        }
    }

    delete_tweet_pathnames(&format!("{TWITTER_ORIGIN}{path}"))
}

/// Prefix `https://` when the value has no http(s) scheme.
pub fn ensure_https(value: &str) -> String {
    if value.starts_with("http://") || value.starts_with("https://") {
        value.to_string()
    } else {
        format!("https://{}", value.trim_start_matches('/'))
    }
}

/// Collapse any run of slashes after `http:`/`https:` to exactly `//`.
pub fn collapse_scheme_slashes(url: &str) -> String {
    SCHEME_SLASHES.replace_all(url, "${1}//").into_owned()
}

/// Escape `;` as `%3B`.
pub fn escape_semicolons(value: &str) -> String {
    value.replace(';', "%3B")
}

/// Whether the URL names exactly one status (a single tweet).
pub fn is_single_status(url: &str) -> bool {
    url.matches("/status/").count() == 1
}

fn clean_post_url(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    if let Some(rest) = without_query.strip_prefix("http://") {
        format!("https://{rest}")
    } else if without_query.starts_with("http") {
        without_query.to_string()
    } else {
        format!("https://{without_query}")
    }
}
