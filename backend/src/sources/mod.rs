//! Clients for the external data sources.
//!
//! Each client owns one upstream: it builds the outbound request, issues it
//! through an [`HttpClient`] with a fixed timeout, and normalizes the
//! upstream document into canonical records.

pub mod adql;
pub mod exoplanet_archive;
pub mod insight_weather;
pub mod neo_feed;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ServiceError, ServiceResult};

pub use exoplanet_archive::{sanitize_star_type, ExoplanetArchive, ExoplanetFilter};
pub use insight_weather::{InsightWeather, WeatherFeed};
pub use neo_feed::NeoFeed;

/// Timeout applied to every outbound call.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Outbound GET request. Query pairs are URL-encoded by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            timeout: UPSTREAM_TIMEOUT,
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Value of the first query pair called `name`.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Status and body of an upstream response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok_json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level failure: the request never produced a response.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Request to {url} timed out after {}s", timeout.as_secs())]
    Timeout { url: String, timeout: Duration },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },
}

/// Outbound HTTP transport.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// Production transport backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent(concat!("cosmic-insights/", env!("CARGO_PKG_VERSION")))
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let response = self
            .client
            .get(&request.url)
            .query(&request.query)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HttpError::Timeout {
                        url: request.url.clone(),
                        timeout: request.timeout,
                    }
                } else {
                    HttpError::Transport {
                        url: request.url.clone(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout {
                    url: request.url.clone(),
                    timeout: request.timeout,
                }
            } else {
                HttpError::Transport {
                    url: request.url.clone(),
                    message: format!("failed to read response body: {}", e),
                }
            }
        })?;

        Ok(HttpResponse { status, body })
    }
}

/// Turns a non-success response into [`ServiceError::Upstream`], keeping the
/// upstream status and whatever error message its body carries.
pub(crate) fn ensure_success(source: &str, response: HttpResponse) -> ServiceResult<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }

    let message = serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|body| upstream_error_message(&body))
        .unwrap_or_else(|| format!("{} returned status {}", source, response.status));

    log::warn!("{} request failed with status {}: {}", source, response.status, message);

    Err(ServiceError::Upstream {
        status: response.status,
        message,
    })
}

fn upstream_error_message(body: &Value) -> Option<String> {
    let error = body.get("error");
    error
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .or_else(|| error.and_then(Value::as_str))
        .or_else(|| body.get("error_message").and_then(Value::as_str))
        .map(str::to_string)
}

pub(crate) fn parse_body<T: DeserializeOwned>(source: &str, response: &HttpResponse) -> ServiceResult<T> {
    serde_json::from_str(&response.body).map_err(|e| {
        ServiceError::internal(format!("Failed to parse {} response: {}", source, e))
    })
}
