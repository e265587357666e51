//! HTTP client with rate limiting for the catalog backend
//!
//! This module provides a rate-limited HTTP client that talks JSON to the
//! catalog backend and implements retry logic with exponential backoff.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::error::{CinemaError, Result};

/// Default backend address (the catalog server's development port)
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// User-Agent sent with every request
const DEFAULT_USER_AGENT: &str = concat!("cinema-core/", env!("CARGO_PKG_VERSION"));

/// Path of the backend's cover image proxy
const COVER_PROXY_PATH: &str = "/media/proxy?url=";

/// Rate limiter to control request frequency
///
/// Ensures that requests are spaced at least `min_interval` apart.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Arc<Mutex<Instant>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the specified requests per second
    ///
    /// # Example
    /// ```
    /// use cinema_core::client::RateLimiter;
    ///
    /// let limiter = RateLimiter::new(2.0); // 2 requests per second
    /// ```
    pub fn new(requests_per_second: f64) -> Self {
        let min_interval = Duration::from_secs_f64(1.0 / requests_per_second);
        let now = Instant::now();
        Self {
            min_interval,
            last_request: Arc::new(Mutex::new(now.checked_sub(min_interval).unwrap_or(now))),
        }
    }

    /// Wait until the minimum interval since the previous request has passed
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();

        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }

        *last = Instant::now();
    }

    /// Get the minimum interval between requests
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// Configuration for the catalog HTTP client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend base URL without trailing slash (default: http://127.0.0.1:5000)
    pub base_url: String,
    /// Maximum requests per second (default: 5.0)
    pub requests_per_second: f64,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Retries for 429 and 5xx answers (default: 3)
    pub max_retries: u32,
    /// First backoff delay, doubled on every retry (default: 1000)
    pub retry_base_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            requests_per_second: 5.0,
            timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 1000,
        }
    }
}

/// Route a cover URL through the backend's image proxy.
///
/// Empty covers stay empty so the view can fall back to its placeholder.
///
/// # Example
/// ```
/// use cinema_core::client::proxied_cover_url;
///
/// assert_eq!(
///     proxied_cover_url("http://localhost:5000", "https://img.example/a b.jpg"),
///     "http://localhost:5000/media/proxy?url=https%3A%2F%2Fimg.example%2Fa%20b.jpg"
/// );
/// assert_eq!(proxied_cover_url("http://localhost:5000", ""), "");
/// ```
pub fn proxied_cover_url(base_url: &str, cover: &str) -> String {
    if cover.is_empty() {
        return String::new();
    }
    format!(
        "{}{}{}",
        base_url.trim_end_matches('/'),
        COVER_PROXY_PATH,
        urlencoding::encode(cover)
    )
}

/// HTTP client for the catalog backend with rate limiting and retry logic
///
/// This client automatically:
/// - Limits request rate to avoid hammering the backend
/// - Retries on transient errors (429, 5xx) with exponential backoff
/// - Decodes JSON bodies into the requested type
#[derive(Debug)]
pub struct CinemaClient {
    client: reqwest::Client,
    rate_limiter: RateLimiter,
    base_url: String,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl CinemaClient {
    /// Create a new client with default configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    ///
    /// # Errors
    /// - `CinemaError::InvalidUrl` - `base_url` is not an absolute http(s) URL
    /// - `CinemaError::InvalidConfig` - `requests_per_second` is not a positive number
    /// - `CinemaError::HttpError` - the HTTP client cannot be created
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let parsed = Url::parse(&config.base_url)
            .map_err(|e| CinemaError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CinemaError::InvalidUrl(config.base_url));
        }
        if !(config.requests_per_second.is_finite() && config.requests_per_second > 0.0) {
            return Err(CinemaError::InvalidConfig(format!(
                "requests_per_second must be positive, got {}",
                config.requests_per_second
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(config.requests_per_second),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
        })
    }

    /// Backend base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a backend path and decode the JSON body.
    ///
    /// # Arguments
    /// * `path` - Path relative to the base URL (e.g., "/movie/list")
    /// * `query` - Query string parameters
    ///
    /// # Errors
    /// - `CinemaError::HttpError` - Network error
    /// - `CinemaError::RateLimited` - Server returned 429 after all retries
    /// - `CinemaError::NotFound` - Server returned 404
    /// - `CinemaError::Api` - Any other non-success status
    /// - `CinemaError::Decode` - Body is not the expected JSON
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let body = self.fetch_with_retry(&url, query).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_with_retry(&self, url: &str, query: &[(&str, String)]) -> Result<String> {
        let mut attempt = 0;
        loop {
            self.rate_limiter.acquire().await;

            let response = self.client.get(url).query(query).send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response.text().await?);
            }

            if status == StatusCode::NOT_FOUND {
                return Err(CinemaError::NotFound(url.to_string()));
            }

            let transient = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            if transient && attempt < self.max_retries {
                let delay = self.calculate_backoff_delay(attempt);
                tracing::warn!(
                    url,
                    status = status.as_u16(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Transient backend error, retrying"
                );
                sleep(delay).await;
                attempt += 1;
                continue;
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(CinemaError::RateLimited);
            }

            return Err(CinemaError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
    }

    /// Calculate exponential backoff delay for retry
    fn calculate_backoff_delay(&self, attempt: u32) -> Duration {
        self.retry_base_delay * 2u32.pow(attempt)
    }
}
