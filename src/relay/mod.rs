//! Line-protocol relay subsystem.
//!
//! # Data Flow
//! ```text
//! InboundRequest (method + raw body)
//!     → forwarder.rs (method check, payload check)
//!     → upstream.rs (HTTPS POST to the write endpoint)
//!     → error.rs (typed outcome)
//!     → RelayResponse (status + plain-text message)
//! ```
//!
//! # Design Decisions
//! - Stateless: nothing carries over between requests
//! - Exactly one upstream attempt per request
//! - Upstream 204 is reported to the device as 200

pub mod error;
pub mod forwarder;
pub mod upstream;

pub use error::RelayError;
pub use forwarder::{Forwarder, InboundRequest};
pub use upstream::{HttpUpstream, TransportError, Upstream, UpstreamResponse};
