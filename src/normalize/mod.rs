//! Normalization of raw source bodies into canonical chat lines.
//!
//! Both sources converge on one line format:
//!
//! ```text
//! [DD/MM/YYYY @ HH:MM:SS] <username> message
//! ```
//!
//! Records that cannot be parsed are skipped, counted, and logged. They never
//! abort the rest of the day.

mod api;
mod archive;
mod error;
pub mod sanity;

use std::fmt;

use tracing::{instrument, warn};

pub use api::{ApiRecord, normalize_api_body, normalize_api_record};
pub use archive::{normalize_archive_body, parse_archive_line};
pub use error::{MalformedReason, MalformedRecord, NormalizeError};

/// Display format for the date half of a canonical timestamp.
pub(crate) const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Display format for the time half of a canonical timestamp.
pub(crate) const DISPLAY_TIME_FORMAT: &str = "%H:%M:%S";

/// One normalized chat line.
///
/// `Display` renders the persisted form without a trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalLine {
    /// `DD/MM/YYYY @ HH:MM:SS`.
    pub timestamp: String,
    /// Sender.
    pub username: String,
    /// Message text, verbatim.
    pub message: String,
}

impl CanonicalLine {
    /// Builds a line from a date and a time of day.
    #[must_use]
    pub fn new(
        date: chrono::NaiveDate,
        time: chrono::NaiveTime,
        username: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: format!(
                "{} @ {}",
                date.format(DISPLAY_DATE_FORMAT),
                time.format(DISPLAY_TIME_FORMAT)
            ),
            username: username.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for CanonicalLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] <{}> {}", self.timestamp, self.username, self.message)
    }
}

/// A day's raw body, tagged with the source it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawDay {
    /// Plain text from the primary archive.
    Archive(String),
    /// JSON array from the fallback API.
    Api(String),
}

impl RawDay {
    /// Short label for logs and stats.
    #[must_use]
    pub fn source_name(&self) -> &'static str {
        match self {
            Self::Archive(_) => "archive",
            Self::Api(_) => "api",
        }
    }

    /// Normalizes the body with the parser for its source.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError`] only when the body as a whole is unusable
    /// (an API response that is not a JSON array). Individual bad records
    /// are reported in [`NormalizedDay::malformed`].
    #[instrument(level = "debug", skip(self), fields(source = self.source_name()))]
    pub fn normalize(&self) -> Result<NormalizedDay, NormalizeError> {
        let day = match self {
            Self::Archive(body) => normalize_archive_body(body),
            Self::Api(body) => normalize_api_body(body)?,
        };
        for record in &day.malformed {
            warn!(source = self.source_name(), %record, "skipping malformed record");
        }
        Ok(day)
    }
}

/// Normalized output for one day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedDay {
    /// Parsed lines in source order.
    pub lines: Vec<CanonicalLine>,
    /// Records that were skipped.
    pub malformed: Vec<MalformedRecord>,
}

/// Renders the persisted text: one line per record, each newline-terminated.
#[must_use]
pub fn render_lines(lines: &[CanonicalLine]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line.to_string());
        out.push('\n');
    }
    out
}
