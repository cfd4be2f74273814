//! Parser for the primary archive's text format.
//!
//! Each line is
//!
//! ```text
//! [YYYY-MM-DD HH:MM:SS UTC] username: message
//! ```
//!
//! The header is a fixed-width token; username and message are split on the
//! first `": "` after it, so messages may themselves contain `": "`.

use chrono::NaiveDateTime;

use super::CanonicalLine;
use super::error::{MalformedReason, MalformedRecord};
use super::NormalizedDay;

/// Timestamp format inside the header brackets.
const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Width of `YYYY-MM-DD HH:MM:SS UTC`.
const ARCHIVE_TIMESTAMP_LEN: usize = 23;

/// Parses one archive line.
///
/// # Errors
///
/// Returns the [`MalformedReason`] describing the first grammar violation.
pub fn parse_archive_line(line: &str) -> Result<CanonicalLine, MalformedReason> {
    let rest = line
        .strip_prefix('[')
        .ok_or(MalformedReason::MissingTimestamp)?;
    let token = rest
        .get(..ARCHIVE_TIMESTAMP_LEN)
        .ok_or(MalformedReason::MissingTimestamp)?;
    let rest = rest[ARCHIVE_TIMESTAMP_LEN..]
        .strip_prefix("] ")
        .ok_or(MalformedReason::MissingTimestamp)?;

    let timestamp = NaiveDateTime::parse_from_str(token, ARCHIVE_TIMESTAMP_FORMAT)
        .map_err(|_| MalformedReason::InvalidTimestamp(token.to_string()))?;

    let (username, message) = rest
        .split_once(": ")
        .ok_or(MalformedReason::MissingDelimiter)?;
    if username.is_empty() {
        return Err(MalformedReason::EmptyUsername);
    }

    Ok(CanonicalLine::new(
        timestamp.date(),
        timestamp.time(),
        username,
        message,
    ))
}

/// Normalizes a whole archive body.
///
/// Carriage returns are stripped first; they break the downstream
/// statistics tools. Only the empty tail after the final newline is
/// dropped, so blank lines inside the body count as malformed.
#[must_use]
pub fn normalize_archive_body(body: &str) -> NormalizedDay {
    let cleaned = body.replace('\r', "");
    let mut lines: Vec<&str> = cleaned.split('\n').collect();
    if lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }

    let mut day = NormalizedDay::default();
    for (index, line) in lines.into_iter().enumerate() {
        match parse_archive_line(line) {
            Ok(parsed) => day.lines.push(parsed),
            Err(reason) => day.malformed.push(MalformedRecord::new(index, reason)),
        }
    }
    day
}
