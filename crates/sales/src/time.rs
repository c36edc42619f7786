//! Date and timestamp parsing for query parameters and export files.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

use backoffice_core::{DomainError, DomainResult};

const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Midnight UTC at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}

/// Parse a timestamp. Naive forms are interpreted as UTC; a bare date means
/// midnight.
pub fn parse_timestamp(raw: &str) -> DomainResult<DateTime<Utc>> {
    let s = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in NAIVE_TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(start_of_day(date));
    }

    Err(DomainError::validation(format!(
        "invalid timestamp '{raw}' (expected RFC 3339 or YYYY-MM-DD HH:MM:SS)"
    )))
}

/// Parse a calendar date. Full timestamps are accepted and truncated to their
/// UTC date.
pub fn parse_date(raw: &str) -> DomainResult<NaiveDate> {
    let s = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    parse_timestamp(s)
        .map(|ts| ts.date_naive())
        .map_err(|_| DomainError::validation(format!("invalid date '{raw}' (expected YYYY-MM-DD)")))
}

pub(crate) fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}
