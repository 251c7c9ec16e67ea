//! Lenient timestamp parsing.
//!
//! Accepts RFC 3339, ISO-like date-times with or without the `T`
//! separator, bare dates, and US `MM/DD/YYYY hh:mm:ss AM` stamps. Values
//! without an offset are taken as UTC.

use crate::error::{CoreError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parses one timestamp. Blank input yields `None`.
///
/// # Errors
/// Returns `CoreError::UnparseableTimestamp` if no format matches.
pub fn parse_timestamp(raw: &str) -> Result<Option<DateTime<Utc>>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }

    for format in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(trimmed, format) {
            return Ok(Some(ts.with_timezone(&Utc)));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(Some(ts.and_utc()));
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return Ok(Some(midnight.and_utc()));
            }
        }
    }

    Err(CoreError::UnparseableTimestamp(trimmed.to_string()))
}

/// Parses several timestamps, failing on the first unparseable one.
///
/// # Errors
/// Returns `CoreError::UnparseableTimestamp` naming the offending input.
pub fn parse_timestamps<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Option<DateTime<Utc>>>> {
    raw.iter().map(|s| parse_timestamp(s.as_ref())).collect()
}
