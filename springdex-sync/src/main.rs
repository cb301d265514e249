//! springdex-sync - Spring-ecosystem version metadata sync service
//!
//! Aggregates version and documentation metadata for the Spring
//! ecosystem from several upstream sources, reconciling them into a
//! single canonical SQLite store. Sync runs are triggered over HTTP
//! and stream progress via SSE.

use anyhow::Result;
use springdex_common::config::ServiceConfig;
use springdex_common::events::EventBus;
use springdex_sync::AppState;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting springdex-sync");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve configuration: ENV over TOML over compiled defaults
    let config = ServiceConfig::resolve();
    info!("Database: {}", config.database_path.display());

    // Initialize database connection pool
    let db_pool = springdex_sync::db::init_database_pool(&config.database_path).await?;
    info!("Database connection established");

    // Create event bus for SSE broadcasting
    let event_bus = EventBus::new(100);
    info!("Event bus initialized");

    // Create application state
    let state = AppState::new(db_pool, event_bus, config.sources.clone());

    // Build router
    let app = springdex_sync::build_router(state);

    // Start server
    let addr = format!("127.0.0.1:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    info!("Trigger a sync: POST http://{}/sync", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
