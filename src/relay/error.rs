//! Relay error taxonomy.
//!
//! Every variant is terminal for the request and renders as a plain-text
//! response whose body is the variant's `Display` output.

use axum::http::StatusCode;
use thiserror::Error;

use crate::relay::upstream::TransportError;

/// Why a payload was not forwarded and acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Inbound request used a method other than POST.
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// Inbound POST carried no body.
    #[error("Missing data payload.")]
    MissingPayload,

    /// Inbound body exceeded `security.max_body_size`.
    #[error("Payload exceeds {limit} bytes.")]
    PayloadTooLarge { limit: usize },

    /// Inbound body could not be read off the connection.
    #[error("Failed to read request body: {0}")]
    UnreadableBody(String),

    /// Upstream answered with anything but 204.
    #[error("InfluxDB Error ({}): {body}", .status.as_u16())]
    Rejected { status: StatusCode, body: String },

    /// The upstream call did not complete.
    #[error("Internal server error during fetch: {0}")]
    Transport(#[from] TransportError),
}

impl RelayError {
    /// Status code returned to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::MissingPayload => StatusCode::BAD_REQUEST,
            RelayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::UnreadableBody(_) => StatusCode::BAD_REQUEST,
            RelayError::Rejected { status, .. } => *status,
            RelayError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            RelayError::MethodNotAllowed => "method_not_allowed",
            RelayError::MissingPayload => "missing_payload",
            RelayError::PayloadTooLarge { .. } => "payload_too_large",
            RelayError::UnreadableBody(_) => "unreadable_body",
            RelayError::Rejected { .. } => "rejected",
            RelayError::Transport(_) => "transport_error",
        }
    }
}
