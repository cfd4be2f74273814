//! Run-level errors.
//!
//! Only failures that stop the whole run live here. Per-day problems
//! (unreachable sources, malformed bodies) are logged and the day is skipped.

use thiserror::Error;

use crate::config::ConfigError;
use crate::date_range::DateError;
use crate::writer::WriteError;

/// Fatal errors for a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A range bound is not `YYYY-MM-DD`.
    #[error(transparent)]
    InvalidDate(#[from] DateError),

    /// Required configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The output directory or a day file could not be written.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
