//! Source retrieval: the shared HTTP client, both log sources, and the
//! retry/fallback policy that drives them.
//!
//! # Example
//!
//! ```no_run
//! use chatlog_core::date_range::parse_day;
//! use chatlog_core::fetch::{ArchiveEndpoint, HttpSource, LogSource, SourceClient};
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = HttpSource::new(
//!     SourceClient::new(),
//!     ArchiveEndpoint::new(Url::parse("https://dgg.overrustlelogs.net")?, "Destinygg"),
//!     Url::parse("https://logs.example.com/rawlogs")?,
//! );
//! let body = source.fetch_archive_day(parse_day("2021-01-01")?.into()).await?;
//! println!("{} bytes", body.len());
//! # Ok(())
//! # }
//! ```

mod acquire;
mod client;
pub mod constants;
mod error;
mod retry;
mod source;

pub use acquire::{DayFetch, DaySkip, acquire_day};
pub use client::SourceClient;
pub use constants::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY, REQUEST_TIMEOUT_SECS};
pub use error::{FetchError, HttpErrorKind, TransportSource};
pub use retry::{FailureType, RetryDecision, RetryPolicy, classify_error};
pub use source::{ArchiveEndpoint, HttpSource, LogSource, SourceOutcome, api_window_url};
