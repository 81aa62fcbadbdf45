//! Bookshelf Server - in-memory book catalog
//!
//! A small Rust REST API server for managing a reading list.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::{lookup_host, TcpListener};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use bookshelf_server::{
    api,
    config::AppConfig,
    repository::BookRepository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("bookshelf_server={},tower_http=debug", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    tracing::info!("Starting Bookshelf Server v{}", env!("CARGO_PKG_VERSION"));

    // Resolve the listen address before moving config
    let addr: SocketAddr = lookup_host((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| format!("Invalid host address: {}", config.server.host))?
        .next()
        .with_context(|| format!("No address found for host: {}", config.server.host))?;

    // Create the catalog and services
    let services = Services::new(BookRepository::new());

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
