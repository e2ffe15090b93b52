//! Timestamp utilities

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

/// Format of the batch timestamp stamped onto uploaded rows
pub const BATCH_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Datetime layouts accepted for stored timestamps, tried in order
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts accepted for stored timestamps
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %b %Y", "%b %d %Y"];

/// Layouts carrying an explicit offset
const OFFSET_FORMATS: &[&str] = &[
    // Twitter API created_at, e.g. "Wed Oct 10 20:19:24 +0000 2018"
    "%a %b %d %H:%M:%S %z %Y",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
];

/// Batch timestamp for an upload happening now, in local time
pub fn batch_timestamp() -> String {
    Local::now().format(BATCH_TIMESTAMP_FORMAT).to_string()
}

/// Truncate a stored timestamp to its calendar date
///
/// Offsets are dropped rather than converted: the date written in the
/// timestamp is the date returned. Returns `None` when no accepted layout
/// matches.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local().date());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.naive_local().date());
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}
