//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, bounded body read)
//!     → relay::Forwarder (validate + forward)
//!     → response.rs (status + plain-text body)
//!     → Send to device
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::RelayResponse;
pub use server::HttpServer;
