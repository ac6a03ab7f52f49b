//! Edge gateway binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                  EDGE GATEWAY                     │
//!   Client Request       │  ┌──────────┐   ┌────────────┐   ┌────────────┐  │
//!   ─────────────────────┼─▶│  http    │──▶│  routing   │──▶│  remote    │──┼──▶ Config service
//!                        │  │  server  │   │ dispatcher │   │  resolver  │  │
//!                        │  └────┬─────┘   └─────┬──────┘   └────────────┘  │
//!                        │       │               │ Rewrite                   │
//!                        │       │               └─────────────────────────▶┼──▶ Application origin
//!                        │       │ PassThrough                               │
//!                        │       ▼                                           │
//!   Client Response      │  ┌──────────┐   ┌────────────┐                    │
//!   ◀────────────────────┼──│  policy  │◀──│  assets    │◀───────────────────┼─── Object storage
//!                        │  │  engine  │   │  resolver  │                    │
//!                        │  └──────────┘   └────────────┘                    │
//!                        │                                                   │
//!                        │  config · observability · lifecycle               │
//!                        └──────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use edge_gateway::config::loader::{default_config, load_config};
use edge_gateway::config::watcher::ConfigWatcher;
use edge_gateway::lifecycle::signals::spawn_signal_handler;
use edge_gateway::observability::{logging, metrics};
use edge_gateway::{GatewayServer, Shutdown};

#[derive(Debug, Parser)]
#[command(name = "edge-gateway", version, about = "Edge request router and static-asset gateway")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "EDGE_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(long)]
    bind: Option<String>,

    /// Do not watch the config file for changes
    #[arg(long)]
    no_watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => default_config()?,
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);

    tracing::info!(
        service = %config.service.name,
        version = %config.service.version,
        environment = %config.service.environment,
        "edge-gateway starting"
    );
    tracing::info!(
        bind_address = %config.listener.bind_address,
        routing = config.routing.enabled,
        fallback_routes = config.routing.fallback.len(),
        remote_config = config.remote_config.connection_string.is_some(),
        site = config.site.as_ref().map(|s| s.storage_root.as_str()),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    // The watcher handle must outlive the server
    let (_watcher, updates) = match cli.config.as_deref().filter(|_| !cli.no_watch) {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            match watcher.run() {
                Ok(handle) => (Some(handle), Some(updates)),
                Err(e) => {
                    tracing::warn!(error = %e, "Config watcher unavailable, hot reload disabled");
                    (None, None)
                }
            }
        }
        None => (None, None),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = GatewayServer::new(&config)?;
    server.run(listener, updates, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
