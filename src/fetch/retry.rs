//! Retry and fallback policy for primary archive fetches.
//!
//! This module provides [`RetryPolicy`] and [`FailureType`] for deciding what
//! happens after a failed primary fetch.
//!
//! # Overview
//!
//! A failed fetch is classified into a [`FailureType`]:
//! - [`FailureType::SourceUnavailable`] - the archive answered with a named
//!   HTTP error or the request timed out. The day is very unlikely to appear
//!   on an immediate retry, so the policy escalates to the fallback source.
//! - [`FailureType::Transient`] - anything else (connection reset, odd status
//!   codes, redirects). Worth retrying the same URL after a fixed pause.
//!
//! The policy is deliberately asymmetric and uses a fixed delay with no
//! jitter: one request at a time against the archive, spaced evenly.
//!
//! # Example
//!
//! ```
//! use chatlog_core::fetch::{FetchError, HttpErrorKind, RetryDecision, RetryPolicy};
//!
//! let policy = RetryPolicy::default();
//! let error = FetchError::http("https://example.com/day.txt", HttpErrorKind::Forbidden);
//!
//! assert!(matches!(policy.decide(&error, 1), RetryDecision::Fallback { .. }));
//! ```

use std::time::Duration;

use tracing::{debug, instrument};

use super::constants::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};
use super::error::{FetchError, HttpErrorKind};

/// Classification of a failed primary fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// The source is blocked, missing, or overloaded for this day.
    ///
    /// Examples: 400, 403, 404, 429, 500, 502, 503, request timeout.
    SourceUnavailable,

    /// Unclassified failure that may succeed on retry.
    ///
    /// Examples: connection refused or reset, redirects, unnamed status codes.
    Transient,
}

/// Decision on what to do after a failed primary fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the primary after the delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Stop using the primary and query the fallback source for the same day.
    Fallback {
        /// Human-readable reason for escalating.
        reason: String,
    },

    /// Stop and skip the day.
    GiveUp {
        /// Human-readable reason for giving up.
        reason: String,
    },
}

/// Primary-source retry configuration.
///
/// # Default Values
///
/// - `max_retries`: 3 (so at most 4 primary attempts)
/// - `delay`: 10 seconds, fixed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    max_retries: u32,

    /// Fixed pause between attempts.
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with custom settings.
    #[must_use]
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Additional primary attempts after the first failure.
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Total primary attempts allowed (first try plus retries).
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Fixed delay between attempts.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Decides what to do after primary attempt `attempt` (1-indexed) failed.
    ///
    /// Source-unavailable failures escalate regardless of attempt count.
    /// Transient failures retry until `max_attempts` is reached.
    #[instrument(skip(self, error), fields(max_retries = self.max_retries, error = %error))]
    pub fn decide(&self, error: &FetchError, attempt: u32) -> RetryDecision {
        match classify_error(error) {
            FailureType::SourceUnavailable => {
                return RetryDecision::Fallback {
                    reason: format!("primary unavailable for this day: {}", describe(error)),
                };
            }
            FailureType::Transient => {}
        }

        if attempt >= self.max_attempts() {
            debug!(attempt, max = self.max_attempts(), "max attempts reached");
            return RetryDecision::GiveUp {
                reason: format!("max retries ({}) exhausted", self.max_retries),
            };
        }

        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = self.delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay: self.delay,
            attempt: attempt + 1,
        }
    }
}

/// Classifies a fetch error for retry decisions.
///
/// | Error | Type |
/// |-------|------|
/// | 400, 403, 404, 429, 500, 502, 503 | SourceUnavailable |
/// | Timeout | SourceUnavailable |
/// | 3xx (redirect not followed) | Transient |
/// | Other status | Transient |
/// | Transport (DNS, refused, reset) | Transient |
/// | Invalid URL | Transient |
#[must_use]
#[allow(clippy::match_same_arms)]
pub fn classify_error(error: &FetchError) -> FailureType {
    match error {
        FetchError::Http { kind, .. } => match kind {
            HttpErrorKind::BadRequest
            | HttpErrorKind::Forbidden
            | HttpErrorKind::NotFound
            | HttpErrorKind::RateLimited
            | HttpErrorKind::ServerError
            | HttpErrorKind::BadGateway
            | HttpErrorKind::Unavailable => FailureType::SourceUnavailable,
            HttpErrorKind::Redirected(_) | HttpErrorKind::Other(_) => FailureType::Transient,
        },
        FetchError::Timeout { .. } => FailureType::SourceUnavailable,
        FetchError::Transport { .. } => FailureType::Transient,
        FetchError::InvalidUrl { .. } => FailureType::Transient,
    }
}

fn describe(error: &FetchError) -> String {
    match error {
        FetchError::Http { kind, .. } => kind.to_string(),
        FetchError::Timeout { .. } => "timeout".to_string(),
        other => other.to_string(),
    }
}
