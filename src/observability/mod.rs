//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handler and forwarder produce:
//!     → logging.rs (structured log events, request ID on every line)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - The upstream token never appears in logs
//! - Metrics are cheap and off by default

pub mod logging;
pub mod metrics;
