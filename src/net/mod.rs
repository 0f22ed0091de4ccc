//! Network layer subsystem.
//!
//! Plain TCP listeners come straight from Tokio; this module only covers the
//! optional TLS termination in front of the HTTP server.

pub mod tls;

pub use tls::{load_tls_config, TlsError};
