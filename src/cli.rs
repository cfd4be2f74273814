//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use chatlog_core::ConfigOverrides;
use chatlog_core::fetch::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY, REQUEST_TIMEOUT_SECS};

/// Pull chat logs for a date range into one text file per day.
///
/// Each day is read from the text archive, or from the fallback API when the
/// archive reports the day unavailable. Days already present in the cache
/// directory are skipped.
#[derive(Parser, Debug)]
#[command(name = "chatlog-puller")]
#[command(author, version, about)]
pub struct Args {
    /// First day to pull (YYYY-MM-DD, inclusive)
    pub from: String,

    /// Last day to pull (YYYY-MM-DD, inclusive)
    pub to: String,

    /// Directory for the per-day output files
    pub output_dir: PathBuf,

    /// Directory holding downstream cache artifacts [default: ./cache]
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Primary archive host [env: CHATLOG_ARCHIVE_URL]
    #[arg(long)]
    pub archive_url: Option<String>,

    /// Archive channel name [default: Destinygg]
    #[arg(long)]
    pub channel: Option<String>,

    /// Fallback API base URL [env: CHATLOG_FALLBACK_URL]
    #[arg(long)]
    pub fallback_url: Option<String>,

    /// Primary retries after an unclassified failure (0-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_RETRIES as u8, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub max_retries: u8,

    /// Seconds to wait between primary retries (max 300)
    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY.as_secs(), value_parser = clap::value_parser!(u64).range(0..=300))]
    pub retry_delay: u64,

    /// Per-request timeout in seconds (1-3600)
    #[arg(short = 't', long, default_value_t = REQUEST_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: u64,

    /// Days processed at once (1-31)
    #[arg(short = 'c', long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=31))]
    pub concurrency: u8,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Explicit values to layer over environment and defaults.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            output_dir: self.output_dir.clone(),
            cache_dir: self.cache_dir.clone(),
            archive_url: self.archive_url.clone(),
            channel: self.channel.clone(),
            fallback_url: self.fallback_url.clone(),
            max_retries: Some(u32::from(self.max_retries)),
            retry_delay_secs: Some(self.retry_delay),
            timeout_secs: Some(self.timeout),
            concurrency: Some(usize::from(self.concurrency)),
        }
    }
}
