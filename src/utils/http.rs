//! HTTP transport for the search API

use crate::error::{HarvestError, HarvestResult, DEFAULT_TIMEOUT_MS};
use crate::types::SearchApi;
use reqwest::{Client, Response};
use std::time::Duration;

const USER_AGENT: &str = concat!("search-harvest/", env!("CARGO_PKG_VERSION"));

/// reqwest client with a fixed per-request timeout
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT_MS)
    }

    /// Create a new HTTP client with custom timeout
    pub fn with_timeout(timeout_ms: u64) -> Self {
        // Builder only fails when the TLS backend cannot initialise
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            default_timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// Per-request timeout, body read included
    pub fn timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Make a GET request and return the response as text
    pub async fn get_text(&self, url: &str) -> HarvestResult<String> {
        let response = self
            .client
            .get(url)
            .timeout(self.default_timeout)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        self.handle_response_text(response).await
    }

    // The timeout covers the body too, so body reads go through here as well
    fn map_transport_error(&self, error: reqwest::Error) -> HarvestError {
        if error.is_timeout() {
            HarvestError::Timeout {
                timeout_ms: self.timeout().as_millis() as u64,
            }
        } else {
            error.into()
        }
    }

    /// Handle HTTP response and return as text
    async fn handle_response_text(&self, response: Response) -> HarvestResult<String> {
        let status = response.status();

        if status.is_success() {
            response
                .text()
                .await
                .map_err(|e| self.map_transport_error(e))
        } else {
            let status_code = status.as_u16();
            let response_body = response.text().await.ok();

            Err(HarvestError::HttpError {
                message: format!("Request failed with status: {status}"),
                status_code: Some(status_code),
                response_body,
            })
        }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SearchApi for HttpClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn get(&self, url: &str) -> HarvestResult<String> {
        self.get_text(url).await
    }
}

/// Short site name used in output file names.
///
/// The scheme is split off, the rest is split on `.`, and the second label is
/// taken for `www` hosts, the first otherwise.
pub fn short_site_name(website: &str) -> HarvestResult<String> {
    let host = website
        .split_once("//")
        .map(|(_, rest)| rest)
        .ok_or_else(|| {
            HarvestError::InvalidInput(format!("Website '{website}' has no scheme"))
        })?;

    let index = if website.contains("www") { 1 } else { 0 };
    host.split('.')
        .nth(index)
        .filter(|label| !label.is_empty())
        .map(|label| label.trim_end_matches('/').to_string())
        .ok_or_else(|| {
            HarvestError::InvalidInput(format!(
                "Cannot derive a site name from '{website}'"
            ))
        })
}
