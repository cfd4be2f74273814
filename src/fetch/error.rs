//! Error types for source fetches.
//!
//! Every failed request is one of three things: a non-200 HTTP response
//! classified into [`HttpErrorKind`], a deadline that elapsed, or some other
//! transport failure. The retry layer decides what to do with each.

use std::fmt;

use thiserror::Error;

/// Boxed source for transport failures (reqwest errors in production).
pub type TransportSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Classification of a non-200 HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    /// 400 Bad Request.
    BadRequest,
    /// 403 Forbidden.
    Forbidden,
    /// 404 Not Found.
    NotFound,
    /// 429 Too Many Requests.
    RateLimited,
    /// 500 Internal Server Error.
    ServerError,
    /// 502 Bad Gateway.
    BadGateway,
    /// 503 Service Unavailable.
    Unavailable,
    /// Any 3xx. Redirects are never followed.
    Redirected(u16),
    /// Any other non-200 status.
    Other(u16),
}

impl HttpErrorKind {
    /// Classifies a status code. Returns `None` only for 200.
    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub fn from_status(status: u16) -> Option<Self> {
        let kind = match status {
            200 => return None,
            400 => Self::BadRequest,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            500 => Self::ServerError,
            502 => Self::BadGateway,
            503 => Self::Unavailable,
            300..=399 => Self::Redirected(status),
            other => Self::Other(other),
        };
        Some(kind)
    }
}

impl fmt::Display for HttpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest => f.write_str("400 Bad Request"),
            Self::Forbidden => f.write_str("403 Forbidden"),
            Self::NotFound => f.write_str("404 Not Found"),
            Self::RateLimited => f.write_str("429 Too Many Requests"),
            Self::ServerError => f.write_str("500 Internal Server Error"),
            Self::BadGateway => f.write_str("502 Bad Gateway"),
            Self::Unavailable => f.write_str("503 Service Unavailable"),
            Self::Redirected(status) => write!(f, "{status} redirect (not followed)"),
            Self::Other(status) => write!(f, "HTTP {status}"),
        }
    }
}

/// Errors that can occur while fetching one source document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with something other than 200.
    #[error("{kind} fetching {url}")]
    Http {
        /// Requested URL.
        url: String,
        /// Classified status.
        kind: HttpErrorKind,
    },

    /// The request deadline elapsed.
    #[error("timeout fetching {url}")]
    Timeout {
        /// Requested URL.
        url: String,
    },

    /// Connection-level failure (DNS, refused, reset, body read aborted).
    #[error("transport error fetching {url}: {source}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Underlying error.
        #[source]
        source: TransportSource,
    },

    /// The URL could not be assembled from configuration.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The rejected URL text.
        url: String,
    },
}

impl FetchError {
    /// Creates a classified HTTP error.
    pub fn http(url: impl Into<String>, kind: HttpErrorKind) -> Self {
        Self::Http {
            url: url.into(),
            kind,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a transport error.
    pub fn transport(url: impl Into<String>, source: impl Into<TransportSource>) -> Self {
        Self::Transport {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Maps a reqwest error onto timeout or transport.
    pub(crate) fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(url)
        } else {
            Self::transport(url, error)
        }
    }

    /// Returns the classified HTTP kind, if this was an HTTP response.
    #[must_use]
    pub fn http_kind(&self) -> Option<HttpErrorKind> {
        match self {
            Self::Http { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns the URL the failed request targeted.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Http { url, .. }
            | Self::Timeout { url }
            | Self::Transport { url, .. }
            | Self::InvalidUrl { url } => url,
        }
    }
}
