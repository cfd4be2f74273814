//! Cache check for days already processed downstream.
//!
//! The statistics tool leaves two artifacts per day in its cache directory:
//! `logs_<YYYY-MM-DD>_txt.pisglines` and `logs_<YYYY-MM-DD>_txt.pisgstats`.
//! When both exist the day is skipped without any network traffic. Only
//! existence is checked; contents and age are never inspected.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::date_range::DaySlot;

/// Default cache directory, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = "./cache";

/// Artifact suffixes that must all be present for a cache hit.
const CACHE_SUFFIXES: [&str; 2] = ["pisglines", "pisgstats"];

/// Existence check against the downstream cache directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheGate {
    dir: PathBuf,
}

impl CacheGate {
    /// Creates a gate over `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The checked directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths whose joint existence marks `day` as cached.
    #[must_use]
    pub fn artifact_paths(&self, day: DaySlot) -> [PathBuf; 2] {
        CACHE_SUFFIXES.map(|suffix| self.dir.join(format!("logs_{day}_txt.{suffix}")))
    }

    /// Returns `true` when every artifact for `day` exists.
    ///
    /// Lookup errors (permissions, broken links) count as "not cached" so the
    /// day is fetched again rather than silently skipped.
    #[instrument(level = "debug", skip(self), fields(day = %day))]
    pub async fn is_cached(&self, day: DaySlot) -> bool {
        for path in self.artifact_paths(day) {
            let exists = tokio::fs::try_exists(&path).await.unwrap_or(false);
            if !exists {
                debug!(path = %path.display(), "cache artifact missing");
                return false;
            }
        }
        true
    }
}

impl Default for CacheGate {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_DIR)
    }
}
