//! Transport to the upstream API.
//!
//! One call to [`Transport::send`] is one attempt: exactly one HTTP request,
//! bounded by the per-attempt timeout. Retrying is not its concern.
//!
//! A success status always yields an [`UpstreamResponse`], whatever its body.
//! Interpreting the body is left to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;
use crate::resilience::HasStatus;

/// Failure of a single attempt.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Response received with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The attempt exceeded the request timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Success status but the body was not the expected JSON.
    #[error("invalid response body (HTTP {status}): {message}")]
    Decode { status: u16, message: String },

    /// Payload could not be encoded as JSON.
    #[error("invalid request body: {0}")]
    Encode(String),

    #[error("transport error: {0}")]
    Other(String),
}

impl HasStatus for TransportError {
    fn status_code(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            // The request went through; sending it again cannot fix the body.
            TransportError::Decode { status, .. } => Some(*status),
            // Rejected before sending; treated like a bad request.
            TransportError::Encode(_) => Some(StatusCode::BAD_REQUEST.as_u16()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else if let Some(status) = e.status() {
            TransportError::Status {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            TransportError::Other(e.to_string())
        }
    }
}

/// Error building the transport from configuration.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// One outbound request.
#[derive(Debug, Clone)]
pub struct TransportRequest<'a> {
    pub method: Method,
    /// Path segments below the base URL; each one is percent-encoded.
    pub segments: &'a [&'a str],
    pub body: Option<&'a Value>,
}

impl<'a> TransportRequest<'a> {
    pub fn get(segments: &'a [&'a str]) -> Self {
        Self {
            method: Method::GET,
            segments,
            body: None,
        }
    }

    pub fn post(segments: &'a [&'a str], body: &'a Value) -> Self {
        Self {
            method: Method::POST,
            segments,
            body: Some(body),
        }
    }

    pub fn delete(segments: &'a [&'a str]) -> Self {
        Self {
            method: Method::DELETE,
            segments,
            body: None,
        }
    }
}

/// A response with a success status, body untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self::new(status, Vec::new())
    }

    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    /// True when the body is absent or only whitespace.
    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    /// Decode the body as `T`. An empty body decodes as JSON `null`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        let decoded = if self.is_empty() {
            serde_json::from_value(Value::Null)
        } else {
            serde_json::from_slice(&self.body)
        };
        decoded.map_err(|e| TransportError::Decode {
            status: self.status,
            message: e.to_string(),
        })
    }
}

/// Performs one attempt against the upstream.
///
/// `Ok` means the upstream answered with a success status.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest<'_>) -> Result<UpstreamResponse, TransportError>;
}

/// [`Transport`] over a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ClientBuildError> {
        let base_url = parse_base_url(&config.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Base URLs are checked to be hierarchical in `parse_base_url`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ClientBuildError> {
    let invalid = |reason: String| ClientBuildError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be a base".to_string()));
    }
    Ok(url)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest<'_>) -> Result<UpstreamResponse, TransportError> {
        let url = self.endpoint(request.segments);
        tracing::debug!(method = %request.method, url = %url, "Upstream request");

        let mut builder = self.client.request(request.method.clone(), url);
        if let Some(body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes).trim().to_string();
            let message = if text.is_empty() {
                status.canonical_reason().unwrap_or("Unknown status").to_string()
            } else {
                text
            };
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(UpstreamResponse::new(status.as_u16(), bytes.to_vec()))
    }
}
