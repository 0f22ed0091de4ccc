//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Router,
};
use influx_relay::config::RelayConfig;
use influx_relay::{HttpServer, Shutdown};
use tokio::net::TcpListener;

pub const WRITE_PATH: &str = "/api/v2/write";
pub const TOKEN: &str = "test-token";

/// One write as received by the mock upstream.
#[derive(Debug, Clone)]
pub struct CapturedWrite {
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[derive(Default)]
struct MockState {
    reply: Mutex<(u16, String)>,
    delay: Mutex<Duration>,
    writes: Mutex<Vec<CapturedWrite>>,
}

/// InfluxDB stand-in that records writes and answers with a programmable reply.
#[derive(Clone)]
pub struct MockUpstream {
    pub addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockUpstream {
    /// Start on an ephemeral port, answering every write with `status` and `body`.
    pub async fn start(status: u16, body: &str) -> Self {
        let state = Arc::new(MockState::default());
        *state.reply.lock().unwrap() = (status, body.to_string());

        let app = Router::new()
            .route(WRITE_PATH, post(write_handler))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}{}?org=home&bucket=sensors&precision=s", self.addr, WRITE_PATH)
    }

    pub fn reply_with(&self, status: u16, body: &str) {
        *self.state.reply.lock().unwrap() = (status, body.to_string());
    }

    pub fn delay_by(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = delay;
    }

    pub fn calls(&self) -> usize {
        self.state.writes.lock().unwrap().len()
    }

    pub fn writes(&self) -> Vec<CapturedWrite> {
        self.state.writes.lock().unwrap().clone()
    }
}

async fn write_handler(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    state.writes.lock().unwrap().push(CapturedWrite {
        authorization: header_text(&headers, header::AUTHORIZATION),
        content_type: header_text(&headers, header::CONTENT_TYPE),
        body,
    });

    let delay = *state.delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let (status, body) = state.reply.lock().unwrap().clone();
    let status = StatusCode::from_u16(status).unwrap();
    if status == StatusCode::NO_CONTENT {
        (status, String::new())
    } else {
        (status, body)
    }
}

fn header_text(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Relay config pointing at `upstream_url` with the test token.
pub fn relay_config(upstream_url: String) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.url = upstream_url;
    config.upstream.token = TOKEN.into();
    config
}

/// A relay served on an ephemeral port.
pub struct RunningRelay {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

impl RunningRelay {
    pub fn ingest_url(&self) -> String {
        format!("http://{}/write-data", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a relay with `config`. The listener is bound before this returns.
pub async fn start_relay(config: RelayConfig) -> RunningRelay {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    RunningRelay {
        addr,
        shutdown,
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
