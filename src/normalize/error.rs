//! Error types for normalization.

use thiserror::Error;

/// Why a single record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    /// Line does not start with a `[YYYY-MM-DD HH:MM:SS UTC]` header.
    #[error("missing timestamp header")]
    MissingTimestamp,

    /// Timestamp present but not a real date/time.
    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),

    /// No `": "` separating username from message.
    #[error("missing username delimiter")]
    MissingDelimiter,

    /// Username field is empty.
    #[error("empty username")]
    EmptyUsername,

    /// JSON element is not a `{time, username, message}` object.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// A record skipped during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("record {index}: {reason}")]
pub struct MalformedRecord {
    /// Zero-based position in the source (line or array index).
    pub index: usize,
    /// Why it was rejected.
    pub reason: MalformedReason,
}

impl MalformedRecord {
    /// Creates a malformed record marker.
    #[must_use]
    pub fn new(index: usize, reason: MalformedReason) -> Self {
        Self { index, reason }
    }
}

/// A body that could not be normalized at all.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The API body is not a JSON array.
    #[error("API response is not a JSON array: {source}")]
    ApiBody {
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}
