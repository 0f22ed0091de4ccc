//! Line-protocol write relay for InfluxDB.
//!
//! Sensor devices POST line protocol over plain HTTP(S) to this service,
//! which forwards it with the write token to an InfluxDB `/api/v2/write`
//! endpoint and reports the outcome back as a short text message.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod relay;

pub use config::schema::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::{Forwarder, InboundRequest, RelayError, Upstream};
