// src/utils/timestamp.rs

//! Capture timestamp normalization.
//!
//! Index timestamps are fixed-width digit strings of 4, 6, 8, 10, 12 or 14
//! characters (`yyyy` up to `yyyyMMddHHmmss`), always UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Digit counts accepted by [`normalize`].
const SUPPORTED_LENGTHS: [usize; 6] = [4, 6, 8, 10, 12, 14];

/// Display format for normalized timestamps.
const DISPLAY_FORMAT: &str = "%Y/%m/%d, %H:%M:%S";

/// Normalize a raw capture timestamp to `YYYY/MM/DD, HH:MM:SS`.
///
/// Missing components default to January, day 1, midnight. Returns `None`
/// for unsupported lengths, non-digit input and impossible dates.
///
/// # Examples
/// ```
/// use cdx_export::utils::timestamp::normalize;
///
/// assert_eq!(normalize("20230615143022").as_deref(), Some("2023/06/15, 14:30:22"));
/// assert_eq!(normalize("2023").as_deref(), Some("2023/01/01, 00:00:00"));
/// assert_eq!(normalize("abc"), None);
/// ```
pub fn normalize(raw: &str) -> Option<String> {
    let len = raw.len();
    if !SUPPORTED_LENGTHS.contains(&len) || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let part = |start: usize, default: u32| -> u32 {
        if len >= start + 2 {
            raw[start..start + 2].parse().unwrap_or(default)
        } else {
            default
        }
    };

    let year: i32 = raw[0..4].parse().ok()?;
    let month = part(4, 1);
    let day = part(6, 1);
    let hour = part(8, 0);
    let minute = part(10, 0);
    let second = part(12, 0);

    let datetime = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    Some(datetime.format(DISPLAY_FORMAT).to_string())
}

/// Normalize a caller-supplied date into a `from`/`to` index bound.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS]` (read as UTC) or RFC 3339.
/// The time is pinned to the start of the day, or to `23:59:59` when
/// `end_of_day` is set. Unparseable input yields `None`.
pub fn normalize_query_date(value: &str, end_of_day: bool) -> Option<String> {
    let date = parse_query_date(value.trim())?;
    let (h, m, s) = if end_of_day { (23, 59, 59) } else { (0, 0, 0) };
    let pinned = date.and_hms_opt(h, m, s)?;
    Some(pinned.format("%Y%m%d%H%M%S").to_string())
}

fn parse_query_date(value: &str) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}
