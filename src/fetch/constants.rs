//! Constants for the fetch module (timeouts, retry pacing, source defaults).

use std::time::Duration;

/// Fixed per-request deadline (connect + headers + body).
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Additional primary attempts after the first unclassified failure.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Fixed pause between primary retries.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Default primary archive host.
pub const DEFAULT_ARCHIVE_URL: &str = "https://dgg.overrustlelogs.net";

/// Default archive channel name (`<channel> chatlog` directory).
pub const DEFAULT_CHANNEL: &str = "Destinygg";

/// Query timestamp format for the fallback API window.
pub const API_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
