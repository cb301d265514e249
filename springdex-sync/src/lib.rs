//! springdex-sync - Spring-ecosystem version metadata sync service
//!
//! Reconciles project, version, and cross-compatibility metadata from
//! several independently-shaped upstream sources into one canonical
//! store, and serves sync triggers plus live progress over HTTP.

pub mod api;
pub mod compat;
pub mod db;
pub mod error;
pub mod reconcile;
pub mod registry;
pub mod relations;
pub mod sources;
pub mod sync;
pub mod version;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use springdex_common::config::SourceEndpoints;
use springdex_common::events::EventBus;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::sync::result::ComprehensiveSyncResult;

/// The sync run currently executing, if any
#[derive(Debug, Clone)]
pub struct ActiveSync {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub cancel_token: CancellationToken,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Upstream source endpoints
    pub sources: SourceEndpoints,
    /// Exclusive-run lock: held for the duration of a sync run
    pub sync_lock: Arc<Mutex<()>>,
    /// The currently running sync, if any
    pub active_sync: Arc<RwLock<Option<ActiveSync>>>,
    /// Result of the most recently completed run
    pub last_result: Arc<RwLock<Option<ComprehensiveSyncResult>>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, event_bus: EventBus, sources: SourceEndpoints) -> Self {
        Self {
            db,
            event_bus,
            sources,
            sync_lock: Arc::new(Mutex::new(())),
            active_sync: Arc::new(RwLock::new(None)),
            last_result: Arc::new(RwLock::new(None)),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::sync_routes())
        .route("/events", get(api::event_stream))
        .merge(api::health_routes())
        .with_state(state)
}
