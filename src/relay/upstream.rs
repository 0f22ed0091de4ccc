//! Upstream write client.
//!
//! # Responsibilities
//! - Send one line-protocol payload to the time-series write endpoint
//! - Attach `Authorization: Token <token>` and `Content-Type: text/plain`
//! - Report transport failures with their full cause chain
//!
//! # Design Decisions
//! - `Upstream` is the seam between the forwarder and the network
//! - One pooled `reqwest::Client` is built at startup and reused
//! - Timeouts are opt-in; with none configured reqwest waits indefinitely
//! - No retries: one payload, one attempt

use std::error::Error as StdError;
use std::future::Future;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use thiserror::Error;

use crate::config::{TimeoutConfig, UpstreamConfig};

/// What the upstream answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    /// Response body as text. Left empty for 204, which has none.
    pub body: String,
}

/// The upstream call did not produce a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest's Display omits the cause ("error sending request for url"),
        // so fold the source chain in.
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            let text = cause.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = cause.source();
        }
        Self { message }
    }
}

/// Destination for forwarded payloads.
pub trait Upstream: Send + Sync + 'static {
    /// Write `payload` verbatim and return the upstream's status and body.
    fn write(
        &self,
        payload: Bytes,
    ) -> impl Future<Output = Result<UpstreamResponse, TransportError>> + Send;
}

/// HTTPS client for an InfluxDB-compatible `/api/v2/write` endpoint.
#[derive(Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    url: String,
    authorization: String,
}

impl HttpUpstream {
    /// Build the client from upstream settings and optional timeouts.
    pub fn new(config: &UpstreamConfig, timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeouts.upstream_connect_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = timeouts.upstream_request_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            url: config.url.clone(),
            authorization: format!("Token {}", config.token),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Upstream for HttpUpstream {
    async fn write(&self, payload: Bytes) -> Result<UpstreamResponse, TransportError> {
        // An empty or malformed URL/token fails here, at send time.
        let response = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, &self.authorization)
            .header(CONTENT_TYPE, "text/plain")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(UpstreamResponse {
                status,
                body: String::new(),
            });
        }

        let body = response.text().await?;
        Ok(UpstreamResponse { status, body })
    }
}

impl std::fmt::Debug for HttpUpstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpUpstream")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}
