//! Per-day acquisition: primary with retries, then fallback.

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::error::FetchError;
use super::retry::{RetryDecision, RetryPolicy};
use super::source::LogSource;
use crate::date_range::DaySlot;
use crate::normalize::RawDay;
use crate::normalize::sanity;

/// Why a day produced no raw body.
#[derive(Debug, Error)]
pub enum DaySkip {
    /// Every primary attempt failed with a retryable error.
    #[error("primary failed after {attempts} attempts ({reason}): {last}")]
    RetriesExhausted {
        /// Primary attempts made.
        attempts: u32,
        /// Policy's reason for stopping.
        reason: String,
        /// Error from the final attempt.
        #[source]
        last: FetchError,
    },

    /// The primary was unavailable and the fallback failed too.
    #[error("fallback failed after primary was unavailable ({primary}): {fallback}")]
    FallbackFailed {
        /// Error that triggered the fallback.
        primary: FetchError,
        /// Fallback error.
        #[source]
        fallback: FetchError,
    },
}

/// Result of driving one day through the sources.
#[derive(Debug)]
pub struct DayFetch {
    /// The raw body, or why there is none.
    pub result: Result<RawDay, DaySkip>,
    /// Number of primary requests issued.
    pub primary_attempts: u32,
    /// Whether the fallback was queried.
    pub used_fallback: bool,
}

impl DayFetch {
    /// Number of primary retries (attempts beyond the first).
    #[must_use]
    pub fn primary_retries(&self) -> u32 {
        self.primary_attempts.saturating_sub(1)
    }
}

/// Fetches one day, retrying the primary and escalating to the fallback per `policy`.
///
/// A successful archive body is run through the truncation heuristic, which
/// only logs.
#[instrument(skip(source, policy), fields(day = %day))]
pub async fn acquire_day(source: &dyn LogSource, policy: &RetryPolicy, day: DaySlot) -> DayFetch {
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        debug!(attempt, "fetching primary archive");

        let error = match source.fetch_archive_day(day).await {
            Ok(body) => {
                if attempt > 1 {
                    info!(attempt, "primary succeeded after retry");
                }
                sanity::check_archive_body(day, &body);
                return DayFetch {
                    result: Ok(RawDay::Archive(body)),
                    primary_attempts: attempt,
                    used_fallback: false,
                };
            }
            Err(error) => error,
        };

        warn!(attempt, url = error.url(), error = %error, "primary fetch failed");

        match policy.decide(&error, attempt) {
            RetryDecision::Retry {
                delay,
                attempt: next_attempt,
            } => {
                info!(
                    attempt = next_attempt,
                    max_attempts = policy.max_attempts(),
                    delay_ms = delay.as_millis(),
                    "retrying primary"
                );
                tokio::time::sleep(delay).await;
            }
            RetryDecision::Fallback { reason } => {
                info!(%reason, "falling back to API");
                let (start, end) = day.window();
                let result = match source.fetch_api_window(start, end).await {
                    Ok(body) => Ok(RawDay::Api(body)),
                    Err(fallback) => Err(DaySkip::FallbackFailed {
                        primary: error,
                        fallback,
                    }),
                };
                return DayFetch {
                    result,
                    primary_attempts: attempt,
                    used_fallback: true,
                };
            }
            RetryDecision::GiveUp { reason } => {
                return DayFetch {
                    result: Err(DaySkip::RetriesExhausted {
                        attempts: attempt,
                        reason,
                        last: error,
                    }),
                    primary_attempts: attempt,
                    used_fallback: false,
                };
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::fetch::HttpErrorKind;
    use crate::test_support::scripted::ScriptedSource;

    fn day() -> DaySlot {
        DaySlot::new(chrono::NaiveDate::from_ymd_opt(2021, 1, 2).unwrap())
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_primary_success_uses_archive() {
        let source = ScriptedSource::new().archive_ok(day(), "[2021-01-02 23:00:00 UTC] a: b\n");
        let fetch = acquire_day(&source, &fast_policy(), day()).await;

        assert!(matches!(fetch.result, Ok(RawDay::Archive(_))));
        assert_eq!(fetch.primary_attempts, 1);
        assert!(!fetch.used_fallback);
        assert_eq!(source.archive_calls(), 1);
        assert_eq!(source.api_calls(), 0);
    }

    #[tokio::test]
    async fn test_forbidden_falls_back_without_primary_retry() {
        let source = ScriptedSource::new()
            .archive_err(day(), HttpErrorKind::Forbidden)
            .api_ok(day(), "[]");
        let fetch = acquire_day(&source, &fast_policy(), day()).await;

        assert!(matches!(fetch.result, Ok(RawDay::Api(_))));
        assert_eq!(fetch.primary_attempts, 1);
        assert_eq!(fetch.primary_retries(), 0);
        assert!(fetch.used_fallback);
        assert_eq!(source.archive_calls(), 1);
        assert_eq!(source.api_calls(), 1);
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let source = ScriptedSource::new().archive_timeout(day()).api_ok(day(), "[]");
        let fetch = acquire_day(&source, &fast_policy(), day()).await;

        assert!(matches!(fetch.result, Ok(RawDay::Api(_))));
        assert_eq!(source.archive_calls(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_retried_three_times_then_skipped() {
        let source = ScriptedSource::new().archive_transport(day()).api_ok(day(), "[]");
        let fetch = acquire_day(&source, &fast_policy(), day()).await;

        assert!(matches!(
            fetch.result,
            Err(DaySkip::RetriesExhausted { attempts: 4, .. })
        ));
        assert_eq!(fetch.primary_attempts, 4);
        assert_eq!(fetch.primary_retries(), 3);
        assert!(!fetch.used_fallback);
        assert_eq!(source.archive_calls(), 4);
        assert_eq!(source.api_calls(), 0);
    }

    #[tokio::test]
    async fn test_transient_then_success() {
        let source = ScriptedSource::new()
            .archive_transport(day())
            .archive_transport(day())
            .archive_ok(day(), "[2021-01-02 23:00:00 UTC] a: b\n");
        let fetch = acquire_day(&source, &fast_policy(), day()).await;

        assert!(matches!(fetch.result, Ok(RawDay::Archive(_))));
        assert_eq!(fetch.primary_attempts, 3);
        assert_eq!(source.archive_calls(), 3);
    }

    #[tokio::test]
    async fn test_classified_error_during_retries_escalates() {
        let source = ScriptedSource::new()
            .archive_transport(day())
            .archive_err(day(), HttpErrorKind::NotFound)
            .api_ok(day(), "[]");
        let fetch = acquire_day(&source, &fast_policy(), day()).await;

        assert!(matches!(fetch.result, Ok(RawDay::Api(_))));
        assert_eq!(fetch.primary_attempts, 2);
        assert!(fetch.used_fallback);
    }

    #[tokio::test]
    async fn test_redirect_is_retried_not_followed() {
        let source = ScriptedSource::new().archive_err(day(), HttpErrorKind::Redirected(301));
        let fetch = acquire_day(&source, &fast_policy(), day()).await;

        assert!(matches!(fetch.result, Err(DaySkip::RetriesExhausted { .. })));
        assert_eq!(source.archive_calls(), 4);
    }

    #[tokio::test]
    async fn test_fallback_failure_skips_day() {
        let source = ScriptedSource::new()
            .archive_err(day(), HttpErrorKind::Unavailable)
            .api_err(day(), HttpErrorKind::Redirected(302));
        let fetch = acquire_day(&source, &fast_policy(), day()).await;

        match fetch.result {
            Err(DaySkip::FallbackFailed { primary, fallback }) => {
                assert_eq!(primary.http_kind(), Some(HttpErrorKind::Unavailable));
                assert_eq!(fallback.http_kind(), Some(HttpErrorKind::Redirected(302)));
            }
            other => panic!("expected FallbackFailed, got {other:?}"),
        }
        assert_eq!(source.api_calls(), 1);
    }

    #[tokio::test]
    async fn test_retry_waits_fixed_delay() {
        let source = ScriptedSource::new()
            .archive_transport(day())
            .archive_ok(day(), "x 23:00:00\n");
        let policy = RetryPolicy::new(3, Duration::from_millis(50));

        let started = std::time::Instant::now();
        let fetch = acquire_day(&source, &policy, day()).await;

        assert!(fetch.result.is_ok());
        assert!(started.elapsed() >= Duration::from_millis(50));
    }
}
