// src/export/csv.rs

use crate::models::{FieldOption, FieldValue, Record};

/// Render records as CSV: a header of field names, then one line per record.
///
/// Lines are joined with `\n` and there is no trailing newline.
pub fn build_csv(records: &[Record], columns: &[FieldOption]) -> String {
    let header = columns
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(",");

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(header);
    for record in records {
        let line = columns
            .iter()
            .map(|c| format_cell(record.get(*c).unwrap_or(&FieldValue::Null)))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }
    lines.join("\n")
}

/// Quote a cell iff it holds a comma, a newline or a quote. Null is empty.
pub fn format_cell(value: &FieldValue) -> String {
    let cell = value.to_cell();
    if cell.contains([',', '\n', '"']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(&FieldValue::Null), "");
        assert_eq!(format_cell(&FieldValue::Flag(true)), "true");
        assert_eq!(format_cell(&"plain".into()), "plain");
        assert_eq!(format_cell(&"a,b".into()), "\"a,b\"");
        assert_eq!(format_cell(&"say \"hi\"".into()), "\"say \"\"hi\"\"\"");
        assert_eq!(format_cell(&"line\nbreak".into()), "\"line\nbreak\"");
    }

    #[test]
    fn test_csv_round_trip() {
        let tricky = "one, \"two\"\nthree";
        let mut record = Record::new();
        record.insert(FieldOption::AvailableTweetText, tricky);
        record.insert(FieldOption::AvailableTweetIsRt, false);
        record.insert(FieldOption::AvailableTweetInfo, FieldValue::Null);
        let columns = [
            FieldOption::AvailableTweetText,
            FieldOption::AvailableTweetIsRt,
            FieldOption::AvailableTweetInfo,
        ];

        let out = build_csv(&[record], &columns);
        let mut reader = ::csv::Reader::from_reader(out.as_bytes());

        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["available_tweet_text", "available_tweet_is_RT", "available_tweet_info"]
        );
        let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], tricky);
        assert_eq!(&rows[0][1], "false");
        assert_eq!(&rows[0][2], "");
    }

    #[test]
    fn test_header_only_when_no_records() {
        let out = build_csv(&[], &[FieldOption::ArchivedTimestamp, FieldOption::ArchivedLength]);
        assert_eq!(out, "archived_timestamp,archived_length");
    }
}
