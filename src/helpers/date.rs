//! Date helper functions

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use std::fmt::Write;

/// Text shown when an article has no publication date
pub const UNKNOWN_DATE: &str = "未知日期";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Format a webhook date string for display.
///
/// RFC 3339 timestamps are shifted into `timezone` (an IANA name, ignored when
/// empty or unknown); naive dates and datetimes are shown as written.
/// Anything unparseable is passed through verbatim.
///
/// # Examples
/// ```ignore
/// format_published_date("2024-01-15T02:30:00Z", "YYYY-MM-DD HH:mm", "Asia/Taipei")
/// // -> "2024-01-15 10:30"
/// ```
pub fn format_published_date(raw: &str, format: &str, timezone: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return UNKNOWN_DATE.to_string();
    }

    let chrono_format = moment_to_chrono_format(format);

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        let formatted = match timezone.parse::<chrono_tz::Tz>() {
            Ok(tz) => format_date(&date.with_timezone(&tz), &chrono_format),
            Err(_) => format_date(&date, &chrono_format),
        };
        return formatted.unwrap_or_else(|| raw.to_string());
    }

    let naive = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        });

    naive
        .and_then(|dt| write_format(dt.format(&chrono_format)))
        .unwrap_or_else(|| raw.to_string())
}

/// Format an aware date; `None` if the format asks for fields it cannot supply
fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, chrono_format: &str) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    write_format(date.format(chrono_format))
}

fn write_format(item: impl std::fmt::Display) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", item).ok()?;
    Some(out)
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    // Longest patterns first within each unit
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("DD", "%d"),
        ("HH", "%H"),
        ("hh", "%I"),
        ("mm", "%M"),
        ("ss", "%S"),
        ("dddd", "%A"),
        ("ddd", "%a"),
        ("ZZ", "%z"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}
