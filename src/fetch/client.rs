//! Shared HTTP client for both log sources.
//!
//! The upstream archive has historically misbehaved with pooled connections
//! and compressed responses, so the client is built once with keep-alive and
//! compression turned off, a fixed whole-request deadline, and redirects
//! disabled. A 3xx response therefore surfaces as
//! [`HttpErrorKind::Redirected`] instead of being followed.

use std::time::Duration;

use reqwest::header::{CONNECTION, HeaderMap, HeaderValue};
use reqwest::{Client, redirect};
use tracing::{debug, instrument};

use super::constants::REQUEST_TIMEOUT_SECS;
use super::error::{FetchError, HttpErrorKind};
use crate::user_agent;

/// HTTP client wrapper used by every source fetch.
///
/// Cheap to clone; clones share the same underlying reqwest client.
#[derive(Debug, Clone)]
pub struct SourceClient {
    client: Client,
}

impl Default for SourceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceClient {
    /// Creates a client with the default 30 second deadline.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static configuration.
    /// This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .expect("failed to build HTTP client with static configuration")
    }

    /// Creates a client with an explicit request deadline.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error if the TLS backend cannot initialize.
    #[instrument(level = "debug")]
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONNECTION, HeaderValue::from_static("close"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .pool_max_idle_per_host(0)
            .no_gzip()
            .no_deflate()
            .redirect(redirect::Policy::none())
            .user_agent(user_agent::default_user_agent())
            .build()?;

        debug!(timeout_secs = timeout.as_secs(), "built source HTTP client");
        Ok(Self { client })
    }

    /// Issues one GET and reads the whole body as text.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Http`] for any status other than 200 (3xx included)
    /// - [`FetchError::Timeout`] when the deadline elapses, including mid-body
    /// - [`FetchError::Transport`] for any other connection or read failure
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        debug!("sending request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status().as_u16();
        if let Some(kind) = HttpErrorKind::from_status(status) {
            debug!(status, %kind, "non-200 response");
            return Err(FetchError::http(url, kind));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        debug!(bytes = body.len(), "response body read");
        Ok(body)
    }
}
