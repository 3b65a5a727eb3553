//! Calendar page retrieval from the source service.
//!
//! ### Pages
//! - Discovery: the profile contributions tab, which lists the years that
//!   have data.
//! - Year: the calendar fragment for `from={y}-01-01&to={y}-12-31`.
//!
//! ### Failure mapping
//! - HTTP 404 → [`Error::UserNotFound`]
//! - transport timeout → [`Error::FetchTimeout`]
//! - any other transport error, non-2xx status or non-UTF-8 body →
//!   [`Error::FetchFailed`]
//! - body over `max_bytes` → [`Error::FetchTooLarge`]
//!
//! No retries happen here. A failed page fails the caller.

pub mod url;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use contribs_core::{AppConfig, Error};
use reqwest::{Client, StatusCode, header};

pub use self::url::{discovery_url, validate_username, year_url};

/// Default source service.
pub const DEFAULT_BASE_URL: &str = "https://github.com";

/// Where calendar markup comes from.
///
/// The pipeline only needs raw page bodies; tests substitute in-process
/// fakes for [`CalendarClient`].
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Markup of the page listing the years that have data.
    async fn discovery_page(&self, username: &str) -> Result<String, Error>;

    /// Markup of one year's calendar.
    async fn year_page(&self, username: &str, year: i32) -> Result<String, Error>;
}

/// Configuration for the calendar client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Source service base URL (default: https://github.com)
    pub base_url: ::url::Url,

    /// User agent string (default: "contribs-api/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Per-request timeout (default: 20s)
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: ::url::Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            user_agent: "contribs-api/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20_000),
        }
    }
}

impl TryFrom<&AppConfig> for FetchConfig {
    type Error = Error;

    fn try_from(config: &AppConfig) -> Result<Self, Self::Error> {
        let base_url = ::url::Url::parse(&config.source_base_url)
            .map_err(|e| Error::Config(format!("source_base_url: {e}")))?;

        Ok(Self {
            base_url,
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
        })
    }
}

/// HTTP client for the source service's calendar pages.
#[derive(Debug, Clone)]
pub struct CalendarClient {
    http: Client,
    config: FetchConfig,
}

impl CalendarClient {
    /// Create a new client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::FetchFailed(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn get(&self, url: ::url::Url, username: &str) -> Result<String, Error> {
        let start = Instant::now();

        let response = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::FetchTimeout(format!("{url}: {e}"))
                } else {
                    Error::FetchFailed(format!("network error for {url}: {e}"))
                }
            })?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(Error::UserNotFound(username.to_string()));
        }

        if !status.is_success() {
            return Err(Error::FetchFailed(format!("status {} for {url}", status.as_u16())));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{len} bytes exceeds {}", self.config.max_bytes)));
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                Error::FetchTimeout(format!("{url}: {e}"))
            } else {
                Error::FetchFailed(format!("failed to read response from {url}: {e}"))
            }
        })?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        tracing::debug!(
            "fetched {} in {}ms ({} bytes)",
            url,
            start.elapsed().as_millis(),
            bytes.len()
        );

        String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::FetchFailed(format!("body of {url} is not UTF-8: {e}")))
    }
}

#[async_trait]
impl CalendarSource for CalendarClient {
    async fn discovery_page(&self, username: &str) -> Result<String, Error> {
        let url = discovery_url(&self.config.base_url, username)?;
        self.get(url, username).await
    }

    async fn year_page(&self, username: &str, year: i32) -> Result<String, Error> {
        let url = year_url(&self.config.base_url, username, year)?;
        self.get(url, username).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.base_url.as_str(), "https://github.com/");
        assert_eq!(config.user_agent, "contribs-api/0.1");
        assert_eq!(config.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.timeout, Duration::from_millis(20_000));
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = AppConfig {
            source_base_url: "http://127.0.0.1:4000".into(),
            user_agent: "test-agent".into(),
            timeout_ms: 1500,
            max_bytes: 1024,
            ..Default::default()
        };

        let config = FetchConfig::try_from(&app).unwrap();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:4000/");
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(config.max_bytes, 1024);
    }

    #[test]
    fn test_unparseable_base_url_is_config_error() {
        let app = AppConfig { source_base_url: "github.com".into(), ..Default::default() };
        let result = FetchConfig::try_from(&app);
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("source_base_url")));
    }

    #[tokio::test]
    async fn test_calendar_client_new() {
        let client = CalendarClient::new(FetchConfig::default());
        assert!(client.is_ok());
    }

    /// Serve one canned HTTP response on a loopback port.
    async fn serve_once(response: &'static [u8]) -> ::url::Url {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(response).await;
            let _ = socket.shutdown().await;
        });
        ::url::Url::parse(&format!("http://{addr}")).unwrap()
    }

    fn client_for(base_url: ::url::Url, max_bytes: usize) -> CalendarClient {
        CalendarClient::new(FetchConfig { base_url, max_bytes, ..Default::default() }).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_is_user_not_found() {
        let base = serve_once(b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n").await;
        let result = client_for(base, 1024).discovery_page("ghost").await;
        assert!(matches!(result, Err(Error::UserNotFound(name)) if name == "ghost"));
    }

    #[tokio::test]
    async fn test_server_error_is_fetch_failed() {
        let base =
            serve_once(b"HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n").await;
        let result = client_for(base, 1024).year_page("octocat", 2021).await;
        assert!(matches!(result, Err(Error::FetchFailed(msg)) if msg.contains("503")));
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let base = serve_once(
            b"HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: 34\r\nconnection: close\r\n\r\n<html><body>calendar</body></html>",
        )
        .await;
        let result = client_for(base, 16).year_page("octocat", 2021).await;
        assert!(matches!(result, Err(Error::FetchTooLarge(_))));
    }

    #[tokio::test]
    async fn test_success_returns_body() {
        let base = serve_once(
            b"HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: 13\r\nconnection: close\r\n\r\n<p>hello</p>\n",
        )
        .await;
        let body = client_for(base, 1024).year_page("octocat", 2021).await.unwrap();
        assert_eq!(body, "<p>hello</p>\n");
    }

    #[tokio::test]
    async fn test_non_utf8_body_is_fetch_failed() {
        let base = serve_once(
            b"HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: 4\r\nconnection: close\r\n\r\n<p\xff>",
        )
        .await;
        let result = client_for(base, 1024).year_page("octocat", 2021).await;
        assert!(matches!(result, Err(Error::FetchFailed(msg)) if msg.contains("UTF-8")));
    }

    #[tokio::test]
    async fn test_invalid_username_short_circuits() {
        let client = CalendarClient::new(FetchConfig::default()).unwrap();
        let result = client.year_page("not/a/user", 2021).await;
        assert!(matches!(result, Err(Error::UserNotFound(name)) if name == "not/a/user"));
    }
}
