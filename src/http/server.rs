//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the ingest and health handlers
//! - Wire up middleware (request ID, tracing)
//! - Read the inbound body under the size limit
//! - Hand writes to the forwarder and log/measure the outcome
//! - Serve over plain TCP or TLS with graceful shutdown

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderName, Method, Request},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::request::{read_body, request_id, UuidRequestId, X_REQUEST_ID};
use crate::http::response::RelayResponse;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::relay::{Forwarder, HttpUpstream, InboundRequest, RelayError, Upstream};

/// Liveness probe path.
pub const HEALTH_PATH: &str = "/health";

/// How long TLS connections get to finish after shutdown is triggered.
const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state injected into handlers.
pub struct AppState<U> {
    pub forwarder: Arc<Forwarder<U>>,
    pub max_body_size: usize,
}

impl<U> Clone for AppState<U> {
    fn clone(&self) -> Self {
        Self {
            forwarder: self.forwarder.clone(),
            max_body_size: self.max_body_size,
        }
    }
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a server forwarding to the configured HTTPS upstream.
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let upstream = HttpUpstream::new(&config.upstream, &config.timeouts)?;
        Ok(Self::with_upstream(config, upstream))
    }

    /// Create a server forwarding to an arbitrary upstream.
    pub fn with_upstream<U: Upstream>(config: RelayConfig, upstream: U) -> Self {
        let state = AppState {
            forwarder: Arc::new(Forwarder::new(upstream)),
            max_body_size: config.security.max_body_size,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router<U: Upstream>(config: &RelayConfig, state: AppState<U>) -> Router {
        let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = %request_id(request.headers()),
            )
        });

        Router::new()
            .route(&config.listener.ingest_path, any(ingest_handler::<U>))
            .route(HEALTH_PATH, get(health_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(
                        HeaderName::from_static(X_REQUEST_ID),
                        UuidRequestId,
                    ))
                    .layer(trace)
                    .layer(PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))),
            )
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            ingest_path = %self.config.listener.ingest_path,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server with TLS termination on `addr`.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        tracing::info!(
            address = %addr,
            ingest_path = %self.config.listener.ingest_path,
            "HTTPS server starting"
        );

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            shutdown.wait().await;
            drain.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Accepts line protocol from devices and relays it upstream.
async fn ingest_handler<U: Upstream>(
    State(state): State<AppState<U>>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let (parts, body) = request.into_parts();
    let request_id = request_id(&parts.headers).to_string();

    // Only POST bodies are read; other methods are refused by the forwarder.
    let body = if parts.method == Method::POST {
        match read_body(&parts.headers, body, state.max_body_size).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Rejected inbound body");
                metrics::record_request(e.outcome(), e.status().as_u16(), start_time);
                return e.into_response();
            }
        }
    } else {
        Bytes::new()
    };

    let bytes = body.len();
    let result = state
        .forwarder
        .forward(InboundRequest::new(parts.method.clone(), body))
        .await;

    let response = match result {
        Ok(()) => {
            tracing::info!(request_id = %request_id, bytes, "Payload forwarded");
            metrics::record_request("forwarded", 200, start_time);
            RelayResponse::forwarded()
        }
        Err(e) => {
            let status = e.status().as_u16();
            match &e {
                RelayError::Transport(_) => {
                    tracing::error!(request_id = %request_id, bytes, error = %e, "Upstream write failed");
                }
                RelayError::Rejected { .. } => {
                    tracing::warn!(request_id = %request_id, bytes, status, error = %e, "Upstream rejected write");
                }
                _ => {
                    tracing::warn!(request_id = %request_id, method = %parts.method, status, error = %e, "Rejected inbound request");
                }
            }
            metrics::record_request(e.outcome(), status, start_time);
            RelayResponse::from(e)
        }
    };

    response.into_response()
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
