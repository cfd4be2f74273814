//! Truncation heuristic for archive days.
//!
//! A complete archive day ends with chatter from the 23 o'clock hour. When
//! the last non-empty line has no `23:MM:SS` in it the file was probably cut
//! short upstream. This only warns; the day is still normalized and written.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::date_range::DaySlot;

/// Matches a clock time in the final hour of the day.
#[allow(clippy::expect_used)]
static ROLLOVER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"23:[0-5][0-9]:[0-5][0-9]").expect("rollover regex is valid") // Static pattern, safe to panic
});

/// Returns the last non-empty line of a body, ignoring carriage returns.
#[must_use]
pub fn last_line(body: &str) -> Option<&str> {
    body.lines()
        .map(|line| line.trim_end_matches('\r'))
        .rev()
        .find(|line| !line.is_empty())
}

/// Returns `true` when the body's last line carries a 23 o'clock timestamp.
#[must_use]
pub fn looks_complete(body: &str) -> bool {
    last_line(body).is_some_and(|line| ROLLOVER_PATTERN.is_match(line))
}

/// Logs a warning when an archive body looks truncated.
///
/// Returns the result of [`looks_complete`].
pub fn check_archive_body(day: DaySlot, body: &str) -> bool {
    let complete = looks_complete(body);
    if !complete {
        warn!(
            day = %day,
            last_line = last_line(body).unwrap_or(""),
            "archive file seems a little sus, might be truncated"
        );
    }
    complete
}
