//! Network fallback stage.
//!
//! Runs last in the pipeline: any request the cache did not answer is
//! fetched over HTTP. Non-2xx responses are returned as responses, not
//! errors; only transport failures are errors.

pub mod url;

use async_trait::async_trait;
use reqwest::{Client, Method};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, resolve};

use crate::intercept::{Middleware, Outcome, Request, Response, Source};
use render_cache_core::{AppConfig, Error, Headers};

/// Configuration for the network fallback.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "render-cache/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Base URL for resolving relative request URLs (default: none)
    pub base_url: Option<::url::Url>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "render-cache/0.1".to_string(), timeout: Duration::from_millis(20_000), base_url: None }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), base_url: config.base_url.clone() }
    }
}

/// Middleware that fetches unanswered requests from the network.
pub struct NetworkFallback {
    http: Client,
    config: FetchConfig,
}

impl NetworkFallback {
    /// Create a new network fallback with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let start = Instant::now();
        let url = resolve(&request.url, self.config.base_url.as_ref()).map_err(|e| Error::InvalidInput(e.to_string()))?;
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| Error::InvalidInput(format!("invalid method `{}`: {e}", request.method)))?;

        let response = self
            .http
            .request(method, url.clone())
            .send()
            .await
            .map_err(|e| Error::HttpError(format!("network error: {e}")))?;

        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::HttpError(format!("failed to read response: {e}")))?;

        tracing::debug!(
            url = %url,
            status,
            bytes = body.len(),
            fetch_ms = start.elapsed().as_millis() as u64,
            "fetched from network"
        );

        Ok(Response { status, headers, body, source: Source::Network })
    }
}

#[async_trait]
impl Middleware for NetworkFallback {
    async fn handle(&self, request: &Request, previous: Outcome) -> Result<Outcome, Error> {
        match previous {
            Outcome::Matched(response) => Ok(Outcome::Matched(response)),
            Outcome::NoMatch => self.fetch(request).await.map(Outcome::Matched),
        }
    }
}
