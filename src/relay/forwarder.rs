//! The write-forwarding pipeline.
//!
//! ```text
//! method == POST? ──no──▶ 405 Method Not Allowed
//!      │ yes
//! body non-empty? ──no──▶ 400 Missing data payload.
//!      │ yes
//! POST body to upstream ──fails──▶ 500 Internal server error during fetch: <msg>
//!      │
//! status == 204? ──yes──▶ 200 Data received and forwarded successfully.
//!      │ no
//!      └──▶ <status> InfluxDB Error (<status>): <upstream body>
//! ```

use std::time::Instant;

use axum::body::Bytes;
use axum::http::{Method, StatusCode};

use crate::http::response::RelayResponse;
use crate::observability::metrics;
use crate::relay::error::RelayError;
use crate::relay::upstream::Upstream;

/// One inbound write, as seen by the forwarder.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub body: Bytes,
}

impl InboundRequest {
    pub fn new(method: Method, body: impl Into<Bytes>) -> Self {
        Self {
            method,
            body: body.into(),
        }
    }
}

/// Validates inbound writes and relays them to an [`Upstream`].
///
/// Holds no per-request state; one instance serves all requests.
#[derive(Debug)]
pub struct Forwarder<U> {
    upstream: U,
}

impl<U: Upstream> Forwarder<U> {
    pub fn new(upstream: U) -> Self {
        Self { upstream }
    }

    pub fn upstream(&self) -> &U {
        &self.upstream
    }

    /// Run the pipeline and render the outcome for the caller.
    pub async fn handle(&self, request: InboundRequest) -> RelayResponse {
        match self.forward(request).await {
            Ok(()) => RelayResponse::forwarded(),
            Err(e) => RelayResponse::from(e),
        }
    }

    /// Run the pipeline, returning `Ok` only when the upstream answered 204.
    pub async fn forward(&self, request: InboundRequest) -> Result<(), RelayError> {
        if request.method != Method::POST {
            return Err(RelayError::MethodNotAllowed);
        }
        if request.body.is_empty() {
            return Err(RelayError::MissingPayload);
        }

        metrics::record_payload_bytes(request.body.len());

        let start = Instant::now();
        let result = self.upstream.write(request.body).await;
        let outcome = match &result {
            Ok(response) if response.status == StatusCode::NO_CONTENT => "accepted",
            Ok(_) => "rejected",
            Err(_) => "transport_error",
        };
        metrics::record_upstream(outcome, start);

        let response = result?;
        if response.status == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(RelayError::Rejected {
                status: response.status,
                body: response.body,
            })
        }
    }
}
