//! shellcache - offline-first app shell cache gateway

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;
mod error;
mod routes;
mod state;

use config::Config;
use routes::create_router;
use shellcache_core::{CacheManager, ShellConfig};
use shellcache_proxy::HttpFetcher;
use shellcache_storage::LocalPartitions;
use state::AppState;

/// shellcache - offline-first cache gateway for a single-page app shell
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "SHELLCACHE_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "SHELLCACHE_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;

    init_logging(&config.logging.level);

    info!("Starting shellcache v{}", env!("CARGO_PKG_VERSION"));

    // Initialize partition storage
    let store = Arc::new(LocalPartitions::new(&config.storage.path).await?);

    // Initialize the network fetcher
    let fetcher = Arc::new(HttpFetcher::new(&config.shell.origin)?);

    // Build the versioned shell configuration
    let shell = ShellConfig::new(
        config.shell.partition_prefix.clone(),
        config.shell.version.clone(),
        config.shell.origin.clone(),
        config.shell.assets.clone(),
    )?;

    let manager = Arc::new(CacheManager::new(shell, store, fetcher));

    // Drive the lifecycle: precache the shell, then retire stale partitions
    manager.install().await?;
    manager.activate().await?;

    let state = AppState::new(manager);
    let app = create_router(state).layer(TraceLayer::new_for_http());

    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);
    info!("Application origin: {}", config.shell.origin);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}
