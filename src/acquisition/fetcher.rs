//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the engine, including:
//! - Building a client with the browser-like header set
//! - GET requests for search result pages and document bodies
//! - HEAD probes for document validation
//! - Error classification into [`FetchError`]
//!
//! Every request goes through the shared [`RateLimiter`].

use crate::acquisition::rate_limiter::RateLimiter;
use crate::config::{EngineConfig, SearchConfig};
use crate::FetchError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_LENGTH, CONTENT_TYPE, REFERER};
use reqwest::{redirect::Policy, Client, Response};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A downloaded document body
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// Final URL after redirects
    pub final_url: String,
    pub status_code: u16,
    /// Content-Type header value, empty if absent
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Headers returned by a HEAD probe
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub final_url: String,
    pub status_code: u16,
    pub content_type: String,
    pub content_length: Option<u64>,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `search` - Header values sent with every request
/// * `engine` - Timeouts and redirect limit
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(FetchError)` - A header value was rejected or the client failed to build
pub fn build_http_client(search: &SearchConfig, engine: &EngineConfig) -> Result<Client, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, header_value(&search.accept)?);
    headers.insert(ACCEPT_LANGUAGE, header_value(&search.accept_language)?);
    if !search.referer.is_empty() {
        headers.insert(REFERER, header_value(&search.referer)?);
    }

    Client::builder()
        .user_agent(search.user_agent.clone())
        .default_headers(headers)
        .timeout(engine.request_timeout())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(engine.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(|e| FetchError::Request {
            url: search.url.clone(),
            message: format!("failed to build HTTP client: {}", e),
        })
}

fn header_value(value: &str) -> Result<HeaderValue, FetchError> {
    HeaderValue::from_str(value).map_err(|e| FetchError::Request {
        url: String::new(),
        message: format!("invalid header value '{}': {}", value, e),
    })
}

/// Builds the search URL for a rendered query
///
/// The query is sent as the `q` parameter; existing parameters on the
/// configured endpoint are kept.
pub fn search_url_for(search_url: &str, query: &str) -> Result<Url, FetchError> {
    Url::parse_with_params(search_url, &[("q", query)]).map_err(|_| FetchError::InvalidUrl {
        url: search_url.to_string(),
    })
}

/// Rate-limited HTTP access shared by every company cascade
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    limiter: Arc<RateLimiter>,
    probe_timeout: Duration,
}

impl Fetcher {
    pub fn new(client: Client, limiter: Arc<RateLimiter>, probe_timeout: Duration) -> Self {
        Self {
            client,
            limiter,
            probe_timeout,
        }
    }

    /// Builds a fetcher from configuration with its own limiter
    pub fn from_config(search: &SearchConfig, engine: &EngineConfig) -> Result<Self, FetchError> {
        let client = build_http_client(search, engine)?;
        let limiter = Arc::new(RateLimiter::from_config(engine));
        Ok(Self::new(client, limiter, engine.probe_timeout()))
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Fetches a page as text, requiring a 2xx status
    ///
    /// Used for search result pages.
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let _permit = self.limiter.acquire().await;
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, &e))?;

        let response = require_success(url, response)?;

        response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Downloads a document body, requiring a 2xx status
    pub async fn fetch_document(&self, url: &str) -> Result<FetchedDocument, FetchError> {
        let _permit = self.limiter.acquire().await;
        tracing::debug!("GET (document) {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, &e))?;

        let response = require_success(url, response)?;
        let final_url = response.url().to_string();
        let status_code = response.status().as_u16();
        let content_type = content_type_of(&response);

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        Ok(FetchedDocument {
            final_url,
            status_code,
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    /// Sends a HEAD request with the shorter probe timeout
    ///
    /// Redirects are followed. Any status is returned to the caller; only
    /// transport failures are errors.
    pub async fn probe(&self, url: &str) -> Result<ProbeResponse, FetchError> {
        let _permit = self.limiter.acquire().await;
        tracing::debug!("HEAD {}", url);

        let response = self
            .client
            .head(url)
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, &e))?;

        let content_length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());

        Ok(ProbeResponse {
            final_url: response.url().to_string(),
            status_code: response.status().as_u16(),
            content_type: content_type_of(&response),
            content_length,
        })
    }
}

fn require_success(url: &str, response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(FetchError::Status {
            url: url.to_string(),
            status_code: status.as_u16(),
        })
    }
}

fn content_type_of(response: &Response) -> String {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}
