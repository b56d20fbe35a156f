//! Sovoli tenant edge router.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────┐
//!                    │                 TENANT ROUTER                  │
//!   Client Request   │  ┌────────┐   ┌──────────┐   ┌─────────────┐  │
//!   ─────────────────┼─▶│  net   │──▶│   http   │──▶│   routing   │  │
//!                    │  │listener│   │  server  │   │  pipeline   │  │
//!                    │  └────────┘   └────┬─────┘   └──────┬──────┘  │
//!                    │                    │                │          │
//!                    │      redirect/404  │   ┌────────────▼───────┐  │
//!   Client Response  │  ◀─────────────────┘   │ lookup (table/http)│  │
//!   ◀────────────────┼──────────┐             └────────────────────┘  │
//!                    │          │ forward (rewritten or unchanged)     │
//!                    │          └──────────────────────────────────────┼──▶ Upstream app
//!                    └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use sovoli_router::config::{self, loader, RouterConfig};
use sovoli_router::lifecycle::Shutdown;
use sovoli_router::net;
use sovoli_router::observability::{logging, metrics};
use sovoli_router::HttpServer;

#[derive(Parser)]
#[command(name = "sovoli-router")]
#[command(about = "Host-based tenant router for the Sovoli platform", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "SOVOLI_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => {
            let mut config = RouterConfig::default();
            loader::apply_root_domain_override(
                &mut config,
                std::env::var(loader::ROOT_DOMAIN_ENV).ok(),
            );
            loader::finalize(config)?
        }
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "sovoli-router starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        root_domain = %config.tenancy.root_domain,
        upstream = %config.upstream.address,
        custom_domains = config.lookup.orgs.iter().filter(|o| o.domain.is_some()).count(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let tls = config.listener.tls.clone();
    let listener_config = config.listener.clone();
    let server = HttpServer::new(config)?;

    match tls {
        Some(tls) => {
            let addr = net::listener::bind_address(&listener_config)?;
            let rustls = net::tls::load_tls_config(&tls).await?;
            server.run_tls(addr, rustls, shutdown.subscribe()).await?;
        }
        None => {
            let listener = net::listener::bind(&listener_config).await?;
            server.run(listener, shutdown.subscribe()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
