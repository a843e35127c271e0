//! Grain Gateway
//!
//! An HTTP front door for a virtual-actor runtime, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                    GRAIN GATEWAY                      │
//!                      │                                                       │
//!   Client Request     │  ┌─────────┐   ┌──────────┐   ┌──────────────┐        │
//!   ───────────────────┼─▶│  http   │──▶│  codec   │──▶│   routing    │        │
//!                      │  │ server  │   │ (decode) │   │ GrainRouter  │        │
//!                      │  └─────────┘   └──────────┘   └──────┬───────┘        │
//!                      │                                      │ GrainKey       │
//!                      │                                      ▼                │
//!   Client Response    │  ┌─────────┐   ┌──────────┐   ┌──────────────┐        │
//!   ◀──────────────────┼──│response │◀──│  codec   │◀──│    grain     │◀───────┼── Runtime
//!                      │  │ status  │   │ (encode) │   │   provider   │        │
//!                      │  └─────────┘   └──────────┘   └──────────────┘        │
//!                      │                                                       │
//!                      │  ┌─────────────────────────────────────────────────┐  │
//!                      │  │  config · observability · admin · lifecycle     │  │
//!                      │  └─────────────────────────────────────────────────┘  │
//!                      └──────────────────────────────────────────────────────┘
//! ```
//!
//! The binary serves the configured routes against the in-process loopback
//! runtime, which echoes each call back to the client.
//!
//! Usage: `grain-gateway [CONFIG]` (defaults to `gateway.toml`; built-in
//! defaults when the file does not exist).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use grain_gateway::config::{load_config, GatewayConfig};
use grain_gateway::grain::LocalGrainProvider;
use grain_gateway::lifecycle::{build_server, Shutdown};
use grain_gateway::observability::{logging, metrics};

const DEFAULT_CONFIG_PATH: &str = "gateway.toml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let (config, loaded) = if path.exists() {
        (load_config(&path)?, true)
    } else {
        (GatewayConfig::default(), false)
    };

    logging::init_logging(&config.observability);
    tracing::info!("grain-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    if loaded {
        tracing::info!(path = %path.display(), "Configuration loaded");
    } else {
        tracing::warn!(path = %path.display(), "Config file not found, using defaults");
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        interfaces = config.interfaces.len(),
        routes = config.routes.len(),
        "Configuration ready"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let provider = Arc::new(LocalGrainProvider::loopback(Duration::from_millis(
        config.runtime.call_timeout_ms,
    )));
    let server = build_server(&config, provider.clone())?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    tokio::spawn(provider.run_deactivation(
        Duration::from_secs(config.runtime.idle_timeout_secs),
        Duration::from_secs(config.runtime.sweep_interval_secs),
        shutdown.subscribe(),
    ));

    let rx = shutdown.subscribe();
    let signals = shutdown.clone();
    tokio::spawn(async move { signals.trigger_on_signal().await });

    server.run(listener, rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
