//! Facet hub service.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                   FACET HUBS                          │
//!                      │                                                       │
//!  GET /hub/...        │  ┌─────────┐    ┌──────────────┐    ┌─────────────┐   │
//!  ────────────────────┼─▶│  http   │───▶│ HubResolver  │───▶│ AllowList   │   │
//!                      │  │ server  │    │              │    │ Resolver    │   │
//!  GET /sitemap*.xml   │  └─────────┘    └──────┬───────┘    └──────┬──────┘   │
//!  ────────────────────┼────────▶ Sitemap ──────┘ assess()          │          │
//!                      │        Synchronizer                 ┌──────▼──────┐   │
//!                      │                                     │ CacheLayer  │   │
//!                      │  ┌────────────────┐                 └──────┬──────┘   │
//!                      │  │ Indexability   │◀── both consumers      │          │
//!                      │  │ Policy         │                 ┌──────▼──────┐   │
//!                      │  └────────────────┘                 │ FacetIndex  │   │
//!                      │                                     └──────┬──────┘   │
//!                      │  products.json / content.json ──▶ InMemoryRepository  │
//!                      │          (watched, hot-reloaded)                      │
//!                      └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use facet_hubs::config::{load_config, HubConfig};
use facet_hubs::lifecycle::{bootstrap, signals, Shutdown};
use facet_hubs::observability::{logging, metrics};
use facet_hubs::HttpServer;

#[derive(Parser)]
#[command(name = "facet-hubs")]
#[command(about = "Faceted SEO hub service", long_about = None)]
struct Args {
    /// Path to the TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => HubConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "facet-hubs starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        base_url = %config.site.base_url,
        cache_enabled = config.cache.enabled,
        cache_ttl_secs = config.cache.ttl_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Metrics disabled");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher stops when dropped; keep it for the whole run.
    let (services, _watcher) = bootstrap(&config)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    HttpServer::new(config, services).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
