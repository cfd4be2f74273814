//! Shared User-Agent string for archive and API requests.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/chatlog-puller";

/// Default User-Agent for source requests (identifies the tool).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("chatlog-puller/{version} (log-archiver; +{PROJECT_UA_URL})")
}
