//! Chatlog Core Library
//!
//! This library pulls historical chat logs for a date range and writes one
//! normalized text file per day, ready for downstream statistics tooling.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`date_range`] - Inclusive date ranges expanded into days
//! - [`cache`] - Existence check for days already processed downstream
//! - [`fetch`] - HTTP client, both log sources, retry and fallback policy
//! - [`normalize`] - Conversion of both source formats to canonical lines
//! - [`writer`] - Per-day output files
//! - [`pipeline`] - The day loop tying everything together
//! - [`config`] - Run configuration from flags, environment, and defaults

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod config;
pub mod date_range;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
mod user_agent;
pub mod writer;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use cache::CacheGate;
pub use config::{ConfigError, ConfigOverrides, PipelineConfig};
pub use date_range::{DateError, DateRange, DaySlot};
pub use error::PipelineError;
pub use fetch::{
    DEFAULT_MAX_RETRIES, FailureType, FetchError, HttpErrorKind, HttpSource, LogSource,
    RetryDecision, RetryPolicy, SourceClient, classify_error,
};
pub use normalize::{CanonicalLine, NormalizedDay, RawDay};
pub use pipeline::{DayOutcome, DayReport, Pipeline, RunStats};
pub use writer::{DayWriter, WriteError};
