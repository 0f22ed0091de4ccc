//! InfluxDB line-protocol relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                 INFLUX RELAY                 │
//!                         │                                              │
//!   Device (ESP8266)      │  ┌────────┐    ┌───────────┐    ┌─────────┐  │
//!   POST line protocol ───┼─▶│  http  │───▶│ forwarder │───▶│upstream │──┼──▶ InfluxDB
//!                         │  │ server │    │  checks   │    │ (HTTPS) │  │    /api/v2/write
//!   200 / 4xx / 500   ◀───┼──│        │◀───│  mapping  │◀───│         │◀─┼─── 204 / error
//!                         │  └────────┘    └───────────┘    └─────────┘  │
//!                         │                                              │
//!                         │   config · observability · lifecycle · tls   │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use influx_relay::config::{load_config, validation::upstream_warnings};
use influx_relay::lifecycle::{signals::spawn_signal_listener, Shutdown};
use influx_relay::net::load_tls_config;
use influx_relay::observability::{logging::init_logging, metrics::init_metrics};
use influx_relay::HttpServer;

#[derive(Parser)]
#[command(name = "influx-relay", version)]
#[command(about = "Relays line protocol from sensor devices to InfluxDB", long_about = None)]
struct Args {
    /// TOML configuration file. INFLUX_URL, INFLUX_TOKEN and
    /// RELAY_BIND_ADDRESS override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    init_logging(&config.observability);

    tracing::info!("influx-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        ingest_path = %config.listener.ingest_path,
        upstream = ?config.upstream,
        tls = config.listener.tls.is_some(),
        upstream_timeout_secs = ?config.timeouts.upstream_request_secs,
        "Configuration loaded"
    );
    for warning in upstream_warnings(&config.upstream) {
        tracing::warn!("{}", warning);
    }

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        init_metrics(addr)?;
    }

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    spawn_signal_listener(shutdown);

    let tls = config.listener.tls.clone();
    let addr: SocketAddr = config.listener.bind_address.parse()?;
    let server = HttpServer::new(config)?;

    match tls {
        Some(tls) => {
            let rustls = load_tls_config(&tls).await?;
            server.run_tls(addr, rustls, server_shutdown).await?;
        }
        None => {
            let listener = TcpListener::bind(addr).await?;
            server.run(listener, server_shutdown).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
