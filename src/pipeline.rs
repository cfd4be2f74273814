//! Day loop: cache check, acquisition, normalization, and persistence.
//!
//! Days are independent. With a concurrency above one they are driven
//! through an order-preserving buffered stream, so completion is reported
//! in calendar order and each day's retry/fallback sequence is unchanged.
//!
//! Per-day failures are logged and counted, never returned. Only output
//! write failures stop the run.

use std::path::PathBuf;
use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream;
use tracing::{info, instrument, warn};

use crate::cache::CacheGate;
use crate::config::PipelineConfig;
use crate::date_range::{DateRange, DaySlot};
use crate::error::PipelineError;
use crate::fetch::{HttpSource, LogSource, RetryPolicy, SourceClient, acquire_day};
use crate::writer::{DayWriter, WriteError};

/// What happened to one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayOutcome {
    /// Both cache artifacts exist; nothing was fetched or written.
    Cached,
    /// Lines were fetched, normalized, and written.
    Written {
        /// File written.
        path: PathBuf,
        /// `"archive"` or `"api"`.
        source: &'static str,
        /// Canonical lines written.
        lines: usize,
        /// Records skipped as malformed.
        malformed: usize,
    },
    /// No usable body could be obtained.
    Skipped {
        /// Rendered cause.
        reason: String,
    },
}

/// Per-day report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayReport {
    /// The day processed.
    pub day: DaySlot,
    /// Outcome.
    pub outcome: DayOutcome,
    /// Primary retries spent on this day.
    pub primary_retries: u32,
    /// Whether the fallback API was queried.
    pub used_fallback: bool,
}

impl DayReport {
    fn cached(day: DaySlot) -> Self {
        Self {
            day,
            outcome: DayOutcome::Cached,
            primary_retries: 0,
            used_fallback: false,
        }
    }
}

/// Counters for a whole run.
///
/// Updated by the task that drains the day stream, in calendar order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    written: usize,
    cached: usize,
    skipped: usize,
    lines: usize,
    malformed: usize,
    retries: usize,
    fallbacks: usize,
}

impl RunStats {
    /// Creates a tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Days written to the output directory.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Days skipped because the cache already covers them.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cached
    }

    /// Days skipped because no source produced a usable body.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Canonical lines written across all days.
    #[must_use]
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Malformed records skipped across all days.
    #[must_use]
    pub fn malformed(&self) -> usize {
        self.malformed
    }

    /// Primary retries issued across all days.
    #[must_use]
    pub fn retries(&self) -> usize {
        self.retries
    }

    /// Days that queried the fallback API.
    #[must_use]
    pub fn fallbacks(&self) -> usize {
        self.fallbacks
    }

    /// Days processed (written + cached + skipped).
    #[must_use]
    pub fn total(&self) -> usize {
        self.written + self.cached + self.skipped
    }

    fn record(&mut self, report: &DayReport) {
        match &report.outcome {
            DayOutcome::Cached => self.cached += 1,
            DayOutcome::Written {
                lines, malformed, ..
            } => {
                self.written += 1;
                self.lines += lines;
                self.malformed += malformed;
            }
            DayOutcome::Skipped { .. } => self.skipped += 1,
        }
        self.retries += usize::try_from(report.primary_retries).unwrap_or(usize::MAX);
        if report.used_fallback {
            self.fallbacks += 1;
        }
    }
}

/// Drives a date range through cache, sources, normalizer, and writer.
pub struct Pipeline {
    source: Arc<dyn LogSource>,
    cache: CacheGate,
    writer: DayWriter,
    policy: RetryPolicy,
    concurrency: usize,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("cache", &self.cache)
            .field("writer", &self.writer)
            .field("policy", &self.policy)
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Creates a sequential pipeline over `source`.
    #[must_use]
    pub fn new(
        source: Arc<dyn LogSource>,
        cache: CacheGate,
        writer: DayWriter,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            source,
            cache,
            writer,
            policy,
            concurrency: 1,
        }
    }

    /// Builds the HTTP client and sources described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Client`] if the HTTP client cannot be built.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let client = SourceClient::with_timeout(config.request_timeout)?;
        let source = HttpSource::new(
            client,
            config.archive.clone(),
            config.fallback_url.clone(),
        );
        Ok(Self::new(
            Arc::new(source),
            CacheGate::new(config.cache_dir.clone()),
            DayWriter::new(config.output_dir.clone()),
            config.retry_policy.clone(),
        )
        .with_concurrency(config.concurrency))
    }

    /// Sets how many days may be in flight at once (minimum 1).
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Days in flight at once.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Processes every day of `range`.
    ///
    /// Returns the run counters. A `from > to` range writes nothing and
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Write`] if the output directory cannot be
    /// created or any day file cannot be written. Days still in flight are
    /// dropped.
    #[instrument(skip(self), fields(from = %range.from(), to = %range.to(), days = range.len()))]
    pub async fn run(&self, range: DateRange) -> Result<RunStats, PipelineError> {
        let mut stats = RunStats::new();
        if range.is_empty() {
            info!("date range is empty, nothing to do");
            return Ok(stats);
        }

        self.writer.ensure_dir().await?;
        info!(concurrency = self.concurrency, "starting run");

        let mut days = stream::iter(range.days())
            .map(|day| self.process_day(day))
            .buffered(self.concurrency);

        while let Some(report) = days.next().await {
            stats.record(&report?);
        }

        info!(
            written = stats.written(),
            cached = stats.cached(),
            skipped = stats.skipped(),
            lines = stats.lines(),
            malformed = stats.malformed(),
            retries = stats.retries(),
            fallbacks = stats.fallbacks(),
            "run complete"
        );
        Ok(stats)
    }

    /// Processes a single day. The output directory is created if missing.
    ///
    /// # Errors
    ///
    /// Only a failed write is returned; every other failure becomes
    /// [`DayOutcome::Skipped`].
    #[instrument(skip(self), fields(day = %day))]
    pub async fn process_day(&self, day: DaySlot) -> Result<DayReport, WriteError> {
        if self.cache.is_cached(day).await {
            info!("found in cache, skipping");
            return Ok(DayReport::cached(day));
        }

        info!("pulling day");
        let fetch = acquire_day(self.source.as_ref(), &self.policy, day).await;
        let primary_retries = fetch.primary_retries();
        let used_fallback = fetch.used_fallback;

        let skipped = |reason: String| DayReport {
            day,
            outcome: DayOutcome::Skipped { reason },
            primary_retries,
            used_fallback,
        };

        let raw = match fetch.result {
            Ok(raw) => raw,
            Err(skip) => {
                warn!(error = %skip, "skipping day");
                return Ok(skipped(skip.to_string()));
            }
        };

        let normalized = match raw.normalize() {
            Ok(normalized) => normalized,
            Err(error) => {
                warn!(source = raw.source_name(), error = %error, "skipping day, body unusable");
                return Ok(skipped(error.to_string()));
            }
        };

        if !normalized.malformed.is_empty() {
            warn!(
                source = raw.source_name(),
                count = normalized.malformed.len(),
                "skipped malformed records"
            );
        }

        let path = self.writer.write_day(day, &normalized.lines).await?;
        info!(
            source = raw.source_name(),
            lines = normalized.lines.len(),
            path = %path.display(),
            "day written"
        );

        Ok(DayReport {
            day,
            outcome: DayOutcome::Written {
                path,
                source: raw.source_name(),
                lines: normalized.lines.len(),
                malformed: normalized.malformed.len(),
            },
            primary_retries,
            used_fallback,
        })
    }
}
