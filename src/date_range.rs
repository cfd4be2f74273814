//! Inclusive calendar-day ranges.
//!
//! A [`DateRange`] expands into [`DaySlot`]s, one per UTC day, inclusive of
//! both endpoints. An inverted range (`from > to`) is valid and simply
//! yields nothing.
//!
//! # Example
//!
//! ```
//! use chatlog_core::date_range::DateRange;
//!
//! let range = DateRange::parse("2021-01-30", "2021-02-01").unwrap();
//! let days: Vec<String> = range.days().map(|day| day.to_string()).collect();
//! assert_eq!(days, ["2021-01-30", "2021-01-31", "2021-02-01"]);
//! ```

use std::fmt;
use std::iter::FusedIterator;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeDelta, Utc};
use thiserror::Error;

/// ISO calendar date format accepted on input and used for file names.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Month-and-year format used by the archive's directory layout (`January 2021`).
const ARCHIVE_MONTH_FORMAT: &str = "%B %Y";

/// Length of a `YYYY-MM-DD` string.
const ISO_DATE_LEN: usize = 10;

/// Errors raised while reading calendar dates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateError {
    /// The input is not a `YYYY-MM-DD` calendar date.
    #[error("invalid date format: {input:?} (expected YYYY-MM-DD)")]
    InvalidDateFormat {
        /// The rejected input.
        input: String,
    },
}

impl DateError {
    /// Creates an invalid-format error.
    pub fn invalid_format(input: impl Into<String>) -> Self {
        Self::InvalidDateFormat {
            input: input.into(),
        }
    }
}

/// Parses a strict `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns [`DateError::InvalidDateFormat`] for anything that is not a real
/// calendar date in that exact shape.
pub fn parse_day(input: &str) -> Result<NaiveDate, DateError> {
    let trimmed = input.trim();
    // chrono accepts unpadded fields; the archive file names never are.
    if trimmed.len() != ISO_DATE_LEN {
        return Err(DateError::invalid_format(input));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| DateError::invalid_format(input))
}

/// One calendar day being processed.
///
/// Identity is the ISO date; `Display` renders it as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DaySlot(NaiveDate);

impl DaySlot {
    /// Wraps a calendar date.
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Returns the calendar date.
    #[must_use]
    pub fn date(self) -> NaiveDate {
        self.0
    }

    /// Returns the archive month directory name (`January 2021`).
    #[must_use]
    pub fn archive_month(self) -> String {
        self.0.format(ARCHIVE_MONTH_FORMAT).to_string()
    }

    /// Returns the UTC midnight that starts this day.
    #[must_use]
    pub fn start(self) -> DateTime<Utc> {
        self.0.and_time(NaiveTime::MIN).and_utc()
    }

    /// Returns the half-open UTC window `[midnight, next midnight)` covering this day.
    #[must_use]
    pub fn window(self) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.start();
        (start, start + TimeDelta::days(1))
    }
}

impl fmt::Display for DaySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl From<NaiveDate> for DaySlot {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// Creates a range from two dates. `from > to` is allowed and is empty.
    #[must_use]
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Parses both endpoints as `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::InvalidDateFormat`] naming the first bad endpoint.
    pub fn parse(from: &str, to: &str) -> Result<Self, DateError> {
        Ok(Self::new(parse_day(from)?, parse_day(to)?))
    }

    /// First day of the range.
    #[must_use]
    pub fn from(&self) -> NaiveDate {
        self.from
    }

    /// Last day of the range.
    #[must_use]
    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// Number of days the range expands to.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.from > self.to {
            return 0;
        }
        let span = (self.to - self.from).num_days();
        usize::try_from(span).map_or(usize::MAX, |days| days.saturating_add(1))
    }

    /// Returns `true` when the range yields no days.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.from > self.to
    }

    /// Returns a fresh iterator over the days. Each call restarts at `from`.
    #[must_use]
    pub fn days(&self) -> DayIter {
        DayIter {
            next: (self.from <= self.to).then_some(self.from),
            end: self.to,
        }
    }
}

impl IntoIterator for DateRange {
    type Item = DaySlot;
    type IntoIter = DayIter;

    fn into_iter(self) -> Self::IntoIter {
        self.days()
    }
}

impl IntoIterator for &DateRange {
    type Item = DaySlot;
    type IntoIter = DayIter;

    fn into_iter(self) -> Self::IntoIter {
        self.days()
    }
}

/// Iterator over the days of a [`DateRange`].
#[derive(Debug, Clone)]
pub struct DayIter {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for DayIter {
    type Item = DaySlot;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if current < self.end {
            current.checked_add_days(Days::new(1))
        } else {
            None
        };
        Some(DaySlot(current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .next
            .map_or(0, |next| DateRange::new(next, self.end).len());
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DayIter {}

impl FusedIterator for DayIter {}
