// src/export/html.rs

//! Standalone HTML document for an export.

use std::fmt::Write;

use crate::models::{ContentKind, FieldOption, FieldValue, Record};

const STYLE: &str = "body{font-family:sans-serif;margin:2rem}\
table{border-collapse:collapse;width:100%}\
th,td{border:1px solid #ccc;padding:.4rem;text-align:left;vertical-align:top;\
white-space:pre-wrap;word-break:break-all}\
th{background:#f4f4f4}";

/// Render records as a self-contained HTML table.
///
/// URL-valued cells become links. Everything else is escaped text.
pub fn build_html(
    kind: ContentKind,
    username: &str,
    records: &[Record],
    columns: &[FieldOption],
) -> String {
    let noun = match kind {
        ContentKind::Tweet => "tweets",
        ContentKind::Post => "Instagram posts",
    };
    let title = format!("@{} archived {}", escape(username), noun);

    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(out, "<title>{title}</title>");
    let _ = writeln!(out, "<style>{STYLE}</style>");
    out.push_str("</head>\n<body>\n");
    let _ = writeln!(out, "<h1>{title}</h1>");
    let _ = writeln!(out, "<p>{} records</p>", records.len());

    out.push_str("<table>\n<thead>\n<tr>");
    for column in columns {
        let _ = write!(out, "<th>{}</th>", column.as_str());
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");

    for record in records {
        out.push_str("<tr>");
        for column in columns {
            let value = record.get(*column).unwrap_or(&FieldValue::Null);
            let _ = write!(out, "<td>{}</td>", render_cell(value));
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    out
}

fn render_cell(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(text) if text.starts_with("http://") || text.starts_with("https://") => {
            let href = escape(text);
            format!("<a href=\"{href}\" target=\"_blank\" rel=\"noopener noreferrer\">{href}</a>")
        }
        other => escape(&other.to_cell()),
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn sample() -> (Vec<Record>, Vec<FieldOption>) {
        let mut first = Record::new();
        first.insert(FieldOption::ParsedTweetUrl, "https://twitter.com/jack/status/20");
        first.insert(FieldOption::AvailableTweetText, "<script>alert('x')</script> & more");
        let mut second = Record::new();
        second.insert(FieldOption::ParsedTweetUrl, FieldValue::Null);
        second.insert(FieldOption::AvailableTweetText, "plain");
        (
            vec![first, second],
            vec![FieldOption::ParsedTweetUrl, FieldOption::AvailableTweetText],
        )
    }

    #[test]
    fn test_html_table_structure() {
        let (records, columns) = sample();
        let html = build_html(ContentKind::Tweet, "jack", &records, &columns);
        let document = Html::parse_document(&html);

        let th = Selector::parse("thead th").unwrap();
        let headers: Vec<String> = document.select(&th).map(|e| e.text().collect()).collect();
        assert_eq!(headers, vec!["parsed_tweet_url", "available_tweet_text"]);

        let rows = Selector::parse("tbody tr").unwrap();
        assert_eq!(document.select(&rows).count(), 2);

        let link = Selector::parse("tbody a").unwrap();
        let anchor = document.select(&link).next().unwrap();
        assert_eq!(
            anchor.value().attr("href"),
            Some("https://twitter.com/jack/status/20")
        );
    }

    #[test]
    fn test_html_escapes_text() {
        let (records, columns) = sample();
        let html = build_html(ContentKind::Tweet, "jack", &records, &columns);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; more"));

        let document = Html::parse_document(&html);
        let script = Selector::parse("script").unwrap();
        assert_eq!(document.select(&script).count(), 0);
    }

    #[test]
    fn test_html_title_per_kind() {
        let html = build_html(ContentKind::Post, "someone", &[], &[]);
        assert!(html.contains("<title>@someone archived Instagram posts</title>"));
        assert!(html.contains("<p>0 records</p>"));
    }
}
