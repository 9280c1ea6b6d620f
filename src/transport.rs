//! HTTP transport for the forecast backend
//!
//! The requester only sees [`ForecastTransport`]; [`HttpTransport`] is the
//! reqwest implementation with a request timeout and optional transient
//! retries.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use tracing::{debug, instrument, warn};

use crate::config::ServerConfig;
use crate::{ForecastError, Result};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Status and raw body of one backend reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, for error reporting
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Request/response capability the requester depends on
#[async_trait]
pub trait ForecastTransport: Send + Sync {
    /// POST a JSON body to a server-relative path
    async fn post_json(&self, path: &str, body: Vec<u8>) -> Result<TransportResponse>;

    /// GET a server-relative path
    async fn get(&self, path: &str) -> Result<TransportResponse>;
}

pub struct HttpTransport {
    client: ClientWithMiddleware,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the configured backend
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("fareforecast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ForecastError::config(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a server-relative path against the base URL
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn read(response: reqwest::Response, started: Instant) -> Result<TransportResponse> {
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ForecastError::transport(format!("Failed to read response body: {e}")))?
            .to_vec();

        let elapsed = started.elapsed();
        debug!(status, bytes = body.len(), "Response received in {:.3}s", elapsed.as_secs_f64());
        if elapsed.as_secs() > 5 {
            warn!("Slow backend response: {:.3}s", elapsed.as_secs_f64());
        }

        Ok(TransportResponse { status, body })
    }
}

#[async_trait]
impl ForecastTransport for HttpTransport {
    #[instrument(name = "http_post", level = "debug", skip(self, body), fields(url = %self.url(path)))]
    async fn post_json(&self, path: &str, body: Vec<u8>) -> Result<TransportResponse> {
        let started = Instant::now();
        let response = self
            .client
            .post(self.url(path))
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| ForecastError::transport(format!("POST {path} failed: {e}")))?;

        Self::read(response, started).await
    }

    #[instrument(name = "http_get", level = "debug", skip(self), fields(url = %self.url(path)))]
    async fn get(&self, path: &str) -> Result<TransportResponse> {
        let started = Instant::now();
        let response = self
            .client
            .get(self.url(path))
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .send()
            .await
            .map_err(|e| ForecastError::transport(format!("GET {path} failed: {e}")))?;

        Self::read(response, started).await
    }
}
