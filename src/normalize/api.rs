//! Parser for the fallback API's JSON records.
//!
//! The API returns an array of `{time, username, message}` objects. Field
//! names have been observed both lower-case and capitalized, so both are
//! accepted. `time` is ISO-8601; only its calendar date and `HH:MM:SS` are
//! used, any fractional seconds and zone marker are dropped.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

use super::error::{MalformedReason, MalformedRecord, NormalizeError};
use super::{CanonicalLine, NormalizedDay};
use crate::date_range::DATE_FORMAT;

/// One record as returned by the fallback API.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApiRecord {
    /// ISO-8601 timestamp, e.g. `2021-01-02T10:11:12.000Z`.
    #[serde(alias = "Time")]
    pub time: String,
    /// Sender.
    #[serde(alias = "Username")]
    pub username: String,
    /// Message text.
    #[serde(alias = "Message")]
    pub message: String,
}

/// Converts one API record to a canonical line.
///
/// # Errors
///
/// Returns [`MalformedReason::InvalidTimestamp`] when `time` does not carry
/// a `YYYY-MM-DDTHH:MM:SS` prefix, or [`MalformedReason::EmptyUsername`].
/// Line breaks inside `username` or `message` are folded into spaces.
pub fn normalize_api_record(record: &ApiRecord) -> Result<CanonicalLine, MalformedReason> {
    let invalid = || MalformedReason::InvalidTimestamp(record.time.clone());

    let (date_part, time_part) = record.time.split_once('T').ok_or_else(invalid)?;
    let date = NaiveDate::parse_from_str(date_part, DATE_FORMAT).map_err(|_| invalid())?;

    // `12:34:56.789Z`, `12:34:56Z`, `12:34:56+00:00` all reduce to `12:34:56`.
    let clock_len = time_part
        .find(|c: char| !(c.is_ascii_digit() || c == ':'))
        .unwrap_or(time_part.len());
    let clock = &time_part[..clock_len];
    if clock.len() != 8 {
        return Err(invalid());
    }
    let time = NaiveTime::parse_from_str(clock, "%H:%M:%S").map_err(|_| invalid())?;

    let username = single_line(&record.username);
    if username.is_empty() {
        return Err(MalformedReason::EmptyUsername);
    }

    Ok(CanonicalLine::new(
        date,
        time,
        username,
        single_line(&record.message),
    ))
}

/// Folds embedded line breaks so one record stays one output line.
///
/// Carriage returns are dropped and each run of `\n` becomes a single space.
/// Text without breaks is returned unchanged.
fn single_line(text: &str) -> String {
    if !text.contains(['\r', '\n']) {
        return text.to_string();
    }
    text.replace('\r', "")
        .split('\n')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes a whole API response body.
///
/// # Errors
///
/// Returns [`NormalizeError::ApiBody`] when the body is not a JSON array.
/// Elements that are not valid records are reported as malformed instead.
pub fn normalize_api_body(body: &str) -> Result<NormalizedDay, NormalizeError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(body).map_err(|source| NormalizeError::ApiBody { source })?;

    let mut day = NormalizedDay::default();
    for (index, value) in values.into_iter().enumerate() {
        let parsed = serde_json::from_value::<ApiRecord>(value)
            .map_err(|e| MalformedReason::InvalidRecord(e.to_string()))
            .and_then(|record| normalize_api_record(&record));
        match parsed {
            Ok(line) => day.lines.push(line),
            Err(reason) => day.malformed.push(MalformedRecord::new(index, reason)),
        }
    }
    Ok(day)
}
