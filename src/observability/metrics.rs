//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): inbound requests by outcome, status
//! - `relay_request_duration_seconds` (histogram): end-to-end latency
//! - `relay_upstream_duration_seconds` (histogram): upstream write latency by outcome
//! - `relay_payload_bytes` (histogram): size of forwarded payloads
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder};

const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
const PAYLOAD_BUCKETS: &[f64] = &[64.0, 256.0, 1024.0, 4096.0, 16384.0, 65536.0, 262144.0, 1048576.0];

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(Matcher::Suffix("duration_seconds".to_string()), LATENCY_BUCKETS)?
        .set_buckets_for_metric(Matcher::Full("relay_payload_bytes".to_string()), PAYLOAD_BUCKETS)?
        .install()?;

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one finished inbound request.
pub fn record_request(outcome: &'static str, status: u16, start: Instant) {
    counter!("relay_requests_total", "outcome" => outcome, "status" => status.to_string()).increment(1);
    histogram!("relay_request_duration_seconds", "outcome" => outcome).record(start.elapsed().as_secs_f64());
}

/// Record one upstream write attempt.
pub fn record_upstream(outcome: &'static str, start: Instant) {
    histogram!("relay_upstream_duration_seconds", "outcome" => outcome).record(start.elapsed().as_secs_f64());
}

/// Record the size of a payload about to be forwarded.
pub fn record_payload_bytes(len: usize) {
    histogram!("relay_payload_bytes").record(len as f64);
}
