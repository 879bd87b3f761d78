//! Serde helpers for query-string filters.
//!
//! Browsers submit empty form fields as `?lote=`, so every optional filter
//! treats an empty value the same as an absent one.
//!
//! Date filters accept either an RFC 3339 timestamp or a bare `YYYY-MM-DD`
//! date. A bare date used as a lower bound means the start of that day, and
//! as an upper bound the last microsecond of that day (UTC), so inclusive
//! comparisons keep sub-second timestamps stamped just before midnight.
//!
//! Body timestamps sent by sensor gateways often lack an offset
//! (`2025-07-01T10:00:00` or `2025-07-01 10:00:00`). Those are read as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer};

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    non_empty(deserializer)
}

pub fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match non_empty(deserializer)? {
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

pub fn deserialize_optional_start<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match non_empty(deserializer)? {
        Some(s) => parse_start_bound(&s).map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

pub fn deserialize_optional_end<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match non_empty(deserializer)? {
        Some(s) => parse_end_bound(&s).map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

pub fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match non_empty(deserializer)? {
        Some(s) => parse_timestamp(&s).map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Parses an RFC 3339 timestamp, or a naive ISO 8601 one taken as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid timestamp '{value}', expected ISO 8601"))
}

pub fn parse_start_bound(value: &str) -> Result<DateTime<Utc>, String> {
    parse_bound(value, NaiveTime::MIN)
}

pub fn parse_end_bound(value: &str) -> Result<DateTime<Utc>, String> {
    let end_of_day =
        NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN);
    parse_bound(value, end_of_day)
}

fn parse_bound(value: &str, time_of_day: NaiveTime) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(time_of_day).and_utc())
        .map_err(|_| format!("invalid date '{value}', expected YYYY-MM-DD or RFC 3339"))
}
