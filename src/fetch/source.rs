//! The two log sources and the trait the pipeline drives them through.
//!
//! - Primary: a whole-day plain-text archive at
//!   `<archive>/<channel> chatlog/<Month YYYY>/<YYYY-MM-DD>.txt`
//! - Fallback: a structured API queried as `<base>?from=<ISO8601Z>&to=<ISO8601Z>`
//!   returning a JSON array of records

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};
use url::Url;

use super::client::SourceClient;
use super::constants::API_TIMESTAMP_FORMAT;
use super::error::FetchError;
use crate::date_range::DaySlot;

/// Result of one fetch attempt: the raw body, or a classified failure.
pub type SourceOutcome = Result<String, FetchError>;

/// A pair of log sources for whole-day retrieval.
///
/// Implemented by [`HttpSource`] in production; tests substitute scripted
/// doubles to observe retry and fallback ordering.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Fetches one day from the primary text archive.
    async fn fetch_archive_day(&self, day: DaySlot) -> SourceOutcome;

    /// Fetches the `[start, end)` window from the fallback API.
    async fn fetch_api_window(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> SourceOutcome;
}

/// Location of the primary archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEndpoint {
    base: Url,
    channel: String,
}

impl ArchiveEndpoint {
    /// Creates an endpoint for `channel` under `base`.
    #[must_use]
    pub fn new(base: Url, channel: impl Into<String>) -> Self {
        Self {
            base,
            channel: channel.into(),
        }
    }

    /// Builds the archive URL for one day.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if the base URL cannot carry a path
    /// (for example `mailto:` or `data:` URLs).
    pub fn day_url(&self, day: DaySlot) -> Result<Url, FetchError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::invalid_url(self.base.as_str()))?
            .pop_if_empty()
            .push(&format!("{} chatlog", self.channel))
            .push(&day.archive_month())
            .push(&format!("{day}.txt"));
        Ok(url)
    }
}

/// Builds the fallback API URL for a time window.
#[must_use]
pub fn api_window_url(base: &Url, start: DateTime<Utc>, end: DateTime<Utc>) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("from", &start.format(API_TIMESTAMP_FORMAT).to_string())
        .append_pair("to", &end.format(API_TIMESTAMP_FORMAT).to_string());
    url
}

/// Production [`LogSource`] backed by the shared [`SourceClient`].
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: SourceClient,
    archive: ArchiveEndpoint,
    api_base: Url,
}

impl HttpSource {
    /// Creates a source pair sharing one client.
    #[must_use]
    pub fn new(client: SourceClient, archive: ArchiveEndpoint, api_base: Url) -> Self {
        Self {
            client,
            archive,
            api_base,
        }
    }
}

#[async_trait]
impl LogSource for HttpSource {
    #[instrument(skip(self), fields(day = %day))]
    async fn fetch_archive_day(&self, day: DaySlot) -> SourceOutcome {
        let url = self.archive.day_url(day)?;
        debug!(url = %url, "fetching archive day");
        self.client.get_text(url.as_str()).await
    }

    #[instrument(skip(self), fields(start = %start, end = %end))]
    async fn fetch_api_window(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> SourceOutcome {
        let url = api_window_url(&self.api_base, start, end);
        debug!(url = %url, "fetching API window");
        self.client.get_text(url.as_str()).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::date_range::parse_day;
    use crate::fetch::HttpErrorKind;
    use crate::test_support::socket_guard::start_mock_server_or_skip;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    fn day(s: &str) -> DaySlot {
        DaySlot::new(parse_day(s).unwrap())
    }

    #[test]
    fn test_day_url_layout() {
        let endpoint = ArchiveEndpoint::new(
            Url::parse("https://dgg.overrustlelogs.net").unwrap(),
            "Destinygg",
        );
        let url = endpoint.day_url(day("2021-01-01")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://dgg.overrustlelogs.net/Destinygg%20chatlog/January%202021/2021-01-01.txt"
        );
    }

    #[test]
    fn test_day_url_keeps_base_path_prefix() {
        let endpoint =
            ArchiveEndpoint::new(Url::parse("http://localhost:8080/mirror/").unwrap(), "Chan");
        let url = endpoint.day_url(day("2020-12-31")).unwrap();
        assert_eq!(url.path(), "/mirror/Chan%20chatlog/December%202020/2020-12-31.txt");
    }

    #[test]
    fn test_day_url_rejects_cannot_be_a_base() {
        let endpoint = ArchiveEndpoint::new(Url::parse("mailto:logs@example.com").unwrap(), "X");
        let err = endpoint.day_url(day("2021-01-01")).unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[test]
    fn test_http_source_invalid_archive_base_fails_without_request() {
        let source = HttpSource::new(
            SourceClient::new(),
            ArchiveEndpoint::new(Url::parse("data:text/plain,hi").unwrap(), "Destinygg"),
            Url::parse("https://api.example.com/rawlogs").unwrap(),
        );
        let result = tokio_test::block_on(source.fetch_archive_day(day("2021-01-01")));
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[test]
    fn test_api_window_url_query() {
        let base = Url::parse("https://api.example.com/tools/rawlogs").unwrap();
        let (start, end) = day("2021-01-02").window();
        let url = api_window_url(&base, start, end);

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("from".to_string(), "2021-01-02T00:00:00Z".to_string()),
                ("to".to_string(), "2021-01-03T00:00:00Z".to_string()),
            ]
        );
        assert_eq!(url.path(), "/tools/rawlogs");
    }

    #[tokio::test]
    async fn test_http_source_fetches_archive_day() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .and(path("/Destinygg%20chatlog/January%202021/2021-01-01.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("archived\n"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let source = HttpSource::new(
            SourceClient::new(),
            ArchiveEndpoint::new(Url::parse(&mock_server.uri()).unwrap(), "Destinygg"),
            Url::parse(&format!("{}/api", mock_server.uri())).unwrap(),
        );

        let body = source.fetch_archive_day(day("2021-01-01")).await.unwrap();
        assert_eq!(body, "archived\n");
    }

    #[tokio::test]
    async fn test_http_source_fetches_api_window() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("from", "2021-01-02T00:00:00Z"))
            .and(query_param("to", "2021-01-03T00:00:00Z"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let source = HttpSource::new(
            SourceClient::new(),
            ArchiveEndpoint::new(Url::parse(&mock_server.uri()).unwrap(), "Destinygg"),
            Url::parse(&format!("{}/api", mock_server.uri())).unwrap(),
        );

        let (start, end) = day("2021-01-02").window();
        let body = source.fetch_api_window(start, end).await.unwrap();
        assert_eq!(body, "[]");
    }

    #[tokio::test]
    async fn test_http_source_api_redirect_is_error() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/elsewhere"))
            .mount(&mock_server)
            .await;

        let source = HttpSource::new(
            SourceClient::new(),
            ArchiveEndpoint::new(Url::parse(&mock_server.uri()).unwrap(), "Destinygg"),
            Url::parse(&format!("{}/api", mock_server.uri())).unwrap(),
        );

        let (start, end) = day("2021-01-02").window();
        let err = source.fetch_api_window(start, end).await.unwrap_err();
        assert_eq!(err.http_kind(), Some(HttpErrorKind::Redirected(301)));
    }
}
