//! Response rendering.
//!
//! # Responsibilities
//! - Carry the status + message produced by the forwarder
//! - Render it as a `text/plain` body for the device
//!
//! # Design Decisions
//! - Bodies are human-readable text, never JSON
//! - Upstream status codes are passed through untouched except 204 → 200

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::relay::RelayError;

/// Message sent to the device once the upstream accepted the write.
pub const FORWARDED_MESSAGE: &str = "Data received and forwarded successfully.";

/// Status and plain-text body returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RelayResponse {
    /// Upstream answered 204.
    pub fn forwarded() -> Self {
        Self {
            status: StatusCode::OK,
            body: FORWARDED_MESSAGE.to_string(),
        }
    }
}

impl From<RelayError> for RelayResponse {
    fn from(err: RelayError) -> Self {
        Self {
            status: err.status(),
            body: err.to_string(),
        }
    }
}

impl IntoResponse for RelayResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))],
            self.body,
        )
            .into_response()
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        RelayResponse::from(self).into_response()
    }
}
