//! Run configuration.
//!
//! Values come from command-line overrides first, then environment variables,
//! then built-in defaults. The fallback API has no default: a run without
//! one is refused before any request is made.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::cache::DEFAULT_CACHE_DIR;
use crate::fetch::constants::{DEFAULT_ARCHIVE_URL, DEFAULT_CHANNEL};
use crate::fetch::{ArchiveEndpoint, REQUEST_TIMEOUT_SECS, RetryPolicy};

/// Environment variable holding the fallback API base URL.
pub const FALLBACK_URL_ENV: &str = "CHATLOG_FALLBACK_URL";

/// Environment variable overriding the primary archive host.
pub const ARCHIVE_URL_ENV: &str = "CHATLOG_ARCHIVE_URL";

/// Allowed day-level concurrency.
pub const CONCURRENCY_RANGE: std::ops::RangeInclusive<usize> = 1..=31;

/// Allowed request timeout, in seconds.
pub const TIMEOUT_SECS_RANGE: std::ops::RangeInclusive<u64> = 1..=3600;

/// Errors raised while resolving configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required value was not provided anywhere.
    #[error("missing required configuration: {name} (set {env} or pass --{flag})")]
    ConfigurationMissing {
        /// Human-readable name.
        name: &'static str,
        /// Environment variable that would supply it.
        env: &'static str,
        /// CLI flag that would supply it.
        flag: &'static str,
    },

    /// A URL value did not parse.
    #[error("invalid URL for {name}: {value:?}")]
    InvalidUrl {
        /// Which setting.
        name: &'static str,
        /// Rejected value.
        value: String,
    },

    /// A numeric value is outside its allowed range.
    #[error("invalid value for {name}: {value}. Expected range: {expected}")]
    OutOfRange {
        /// Which setting.
        name: &'static str,
        /// Rejected value.
        value: u64,
        /// Allowed range, rendered.
        expected: String,
    },
}

/// Values supplied explicitly (usually from the command line).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Output directory for per-day files.
    pub output_dir: PathBuf,
    /// Downstream cache directory.
    pub cache_dir: Option<PathBuf>,
    /// Primary archive host.
    pub archive_url: Option<String>,
    /// Archive channel name.
    pub channel: Option<String>,
    /// Fallback API base URL.
    pub fallback_url: Option<String>,
    /// Primary retries after an unclassified failure.
    pub max_retries: Option<u32>,
    /// Seconds between primary retries.
    pub retry_delay_secs: Option<u64>,
    /// Per-request deadline in seconds.
    pub timeout_secs: Option<u64>,
    /// Days processed at once.
    pub concurrency: Option<usize>,
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Primary archive location.
    pub archive: ArchiveEndpoint,
    /// Fallback API base URL.
    pub fallback_url: Url,
    /// Output directory for per-day files.
    pub output_dir: PathBuf,
    /// Downstream cache directory.
    pub cache_dir: PathBuf,
    /// Primary retry behavior.
    pub retry_policy: RetryPolicy,
    /// Per-request deadline.
    pub request_timeout: Duration,
    /// Days processed at once.
    pub concurrency: usize,
}

impl PipelineConfig {
    /// Resolves configuration using the process environment.
    ///
    /// # Errors
    ///
    /// See [`PipelineConfig::resolve`].
    pub fn from_env(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::resolve(overrides, |name| std::env::var(name).ok())
    }

    /// Resolves configuration with an explicit environment lookup.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ConfigurationMissing`] when no fallback URL is set
    /// - [`ConfigError::InvalidUrl`] when a URL does not parse
    /// - [`ConfigError::OutOfRange`] for timeout or concurrency out of bounds
    pub fn resolve(
        overrides: ConfigOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let lookup = |name: &str| {
            env(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let fallback_raw = overrides
            .fallback_url
            .or_else(|| lookup(FALLBACK_URL_ENV))
            .ok_or(ConfigError::ConfigurationMissing {
                name: "fallback API URL",
                env: FALLBACK_URL_ENV,
                flag: "fallback-url",
            })?;
        let fallback_url = parse_url("fallback API URL", &fallback_raw)?;

        let archive_raw = overrides
            .archive_url
            .or_else(|| lookup(ARCHIVE_URL_ENV))
            .unwrap_or_else(|| DEFAULT_ARCHIVE_URL.to_string());
        let archive_url = parse_url("archive URL", &archive_raw)?;
        let channel = overrides
            .channel
            .unwrap_or_else(|| DEFAULT_CHANNEL.to_string());

        let timeout_secs = overrides.timeout_secs.unwrap_or(REQUEST_TIMEOUT_SECS);
        if !TIMEOUT_SECS_RANGE.contains(&timeout_secs) {
            return Err(ConfigError::OutOfRange {
                name: "timeout",
                value: timeout_secs,
                expected: format!("{TIMEOUT_SECS_RANGE:?}"),
            });
        }

        let concurrency = overrides.concurrency.unwrap_or(1);
        if !CONCURRENCY_RANGE.contains(&concurrency) {
            return Err(ConfigError::OutOfRange {
                name: "concurrency",
                value: u64::try_from(concurrency).unwrap_or(u64::MAX),
                expected: format!("{CONCURRENCY_RANGE:?}"),
            });
        }

        let default_policy = RetryPolicy::default();
        let retry_policy = RetryPolicy::new(
            overrides.max_retries.unwrap_or(default_policy.max_retries()),
            overrides
                .retry_delay_secs
                .map_or(default_policy.delay(), Duration::from_secs),
        );

        let config = Self {
            archive: ArchiveEndpoint::new(archive_url, channel),
            fallback_url,
            output_dir: overrides.output_dir,
            cache_dir: overrides
                .cache_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
            retry_policy,
            request_timeout: Duration::from_secs(timeout_secs),
            concurrency,
        };
        debug!(?config, "configuration resolved");
        Ok(config)
    }
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|_| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            name,
            value: value.to_string(),
        });
    }
    Ok(url)
}
