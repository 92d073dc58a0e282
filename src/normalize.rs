//! Payload normalization at the client boundary
//!
//! The backend is not consistent about field shapes: coordinates may arrive as
//! numbers or numeric strings, dates as ISO dates or RFC 1123 timestamps, and
//! optional text as `""`. These helpers fold all of them into one schema so the
//! store and CLI only ever see `Option<f64>`, `Option<NaiveDate>` and
//! `Option<String>`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Deserialize an optional float that may be encoded as a string
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("invalid number: {}", s)))
        }
    }
}

/// Deserialize an optional string, treating `""` as absent
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

/// Deserialize an optional calendar date
///
/// Accepts `2024-05-01`, `2024-05-01T00:00:00`, RFC 3339 and RFC 1123
/// (`Wed, 01 May 2024 00:00:00 GMT`).
pub fn opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = opt_string(deserializer)? else {
        return Ok(None);
    };
    parse_date(&raw)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", raw)))
}

/// Parse a date in any of the formats the backend emits
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    DateTime::parse_from_rfc2822(raw).ok().map(|dt| dt.date_naive())
}
