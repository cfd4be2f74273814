//! Persistence of normalized days.
//!
//! Each day becomes `<output_dir>/<YYYY-MM-DD>.txt`: UTF-8, one canonical
//! line per record, each newline-terminated, no header or footer. Existing
//! files are truncated. Any write failure is fatal to the run.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};

use crate::date_range::DaySlot;
use crate::normalize::{CanonicalLine, render_lines};

/// Errors raised while persisting output.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Creating or writing an output file or directory failed.
    #[error("failed writing {path}: {source}")]
    Output {
        /// Path being written.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl WriteError {
    /// Creates an output error.
    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }
}

/// Writes per-day output files under one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayWriter {
    dir: PathBuf,
}

impl DayWriter {
    /// Creates a writer targeting `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Output path for `day`.
    #[must_use]
    pub fn path_for(&self, day: DaySlot) -> PathBuf {
        self.dir.join(format!("{day}.txt"))
    }

    /// Creates the output directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::Output`] when the directory cannot be created.
    pub async fn ensure_dir(&self) -> Result<(), WriteError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| WriteError::output(self.dir.clone(), e))
    }

    /// Writes `lines` for `day`, replacing any previous file.
    ///
    /// Creates the output directory first if needed. Returns the path written.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::Output`] on any directory, create, write, or
    /// flush failure.
    #[instrument(skip(self, lines), fields(day = %day, lines = lines.len()))]
    pub async fn write_day(
        &self,
        day: DaySlot,
        lines: &[CanonicalLine],
    ) -> Result<PathBuf, WriteError> {
        self.ensure_dir().await?;
        let path = self.path_for(day);
        let file = File::create(&path)
            .await
            .map_err(|e| WriteError::output(path.clone(), e))?;

        let mut writer = BufWriter::new(file);
        writer
            .write_all(render_lines(lines).as_bytes())
            .await
            .map_err(|e| WriteError::output(path.clone(), e))?;

        // Ensure all data is flushed to disk
        writer
            .flush()
            .await
            .map_err(|e| WriteError::output(path.clone(), e))?;

        debug!(path = %path.display(), "day written");
        Ok(path)
    }
}
