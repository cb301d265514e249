//! Sync trigger API handlers
//!
//! POST /sync, POST /sync/phase/{name}, POST /sync/cancel,
//! GET /sync/status
//!
//! A run is exclusive: the trigger takes the sync mutex without
//! waiting and a concurrent trigger is rejected with 409 rather than
//! queued. Reconciliation reads-then-writes without row locks, so two
//! interleaved runs could race each other's updates.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::sync::result::{ComprehensiveSyncResult, PhaseResult};
use crate::sync::ComprehensiveSync;
use crate::{ActiveSync, AppState};

/// POST /sync response
#[derive(Debug, Serialize)]
pub struct StartSyncResponse {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub total_phases: usize,
}

/// GET /sync/status response
#[derive(Debug, Serialize)]
pub struct SyncStatusResponse {
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_result: Option<ComprehensiveSyncResult>,
}

/// POST /sync/cancel response
#[derive(Debug, Serialize)]
pub struct CancelSyncResponse {
    pub run_id: Uuid,
    pub cancelled_at: DateTime<Utc>,
}

/// POST /sync
///
/// Trigger a full sync run in the background. Rejected with 409 when a
/// run is already active.
pub async fn start_sync(State(state): State<AppState>) -> ApiResult<Json<StartSyncResponse>> {
    let guard = state
        .sync_lock
        .clone()
        .try_lock_owned()
        .map_err(|_| ApiError::Conflict("Sync already running".to_string()))?;

    let sync = ComprehensiveSync::new(
        state.db.clone(),
        state.event_bus.clone(),
        &state.sources,
    )
    .map_err(|e| ApiError::Internal(format!("Failed to initialize sync clients: {}", e)))?;

    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    let cancel_token = CancellationToken::new();

    *state.active_sync.write().await = Some(ActiveSync {
        run_id,
        started_at,
        cancel_token: cancel_token.clone(),
    });

    tracing::info!(run_id = %run_id, "Sync run triggered");

    let task_state = state.clone();
    tokio::spawn(async move {
        // The guard lives for the whole run; dropping it releases the
        // exclusive lock for the next trigger
        let _guard = guard;

        let result = sync.run(run_id, cancel_token).await;

        *task_state.last_result.write().await = Some(result);
        *task_state.active_sync.write().await = None;
    });

    Ok(Json(StartSyncResponse {
        run_id,
        started_at,
        total_phases: crate::sync::TOTAL_PHASES,
    }))
}

/// POST /sync/phase/{name}
///
/// Run a single named phase and return its result inline. Subject to
/// the same exclusivity as a full run.
pub async fn start_phase(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<PhaseResult>> {
    let _guard = state
        .sync_lock
        .clone()
        .try_lock_owned()
        .map_err(|_| ApiError::Conflict("Sync already running".to_string()))?;

    let sync = ComprehensiveSync::new(
        state.db.clone(),
        state.event_bus.clone(),
        &state.sources,
    )
    .map_err(|e| ApiError::Internal(format!("Failed to initialize sync clients: {}", e)))?;

    tracing::info!(phase = %name, "Single-phase sync triggered");

    let result = sync
        .run_phase(&name)
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok(Json(result))
}

/// POST /sync/cancel
///
/// Request cooperative cancellation of the active run. The run stops at
/// the next phase boundary.
pub async fn cancel_sync(State(state): State<AppState>) -> ApiResult<Json<CancelSyncResponse>> {
    let active = state.active_sync.read().await.clone();

    match active {
        Some(active) => {
            active.cancel_token.cancel();
            tracing::info!(run_id = %active.run_id, "Sync cancellation requested");

            Ok(Json(CancelSyncResponse {
                run_id: active.run_id,
                cancelled_at: Utc::now(),
            }))
        }
        None => Err(ApiError::NotFound("No active sync run".to_string())),
    }
}

/// GET /sync/status
pub async fn sync_status(State(state): State<AppState>) -> Json<SyncStatusResponse> {
    let active = state.active_sync.read().await.clone();
    let last_result = state.last_result.read().await.clone();

    Json(SyncStatusResponse {
        running: active.is_some(),
        run_id: active.as_ref().map(|a| a.run_id),
        started_at: active.as_ref().map(|a| a.started_at),
        last_result,
    })
}

/// Build sync trigger routes
pub fn sync_routes() -> Router<AppState> {
    Router::new()
        .route("/sync", post(start_sync))
        .route("/sync/phase/:name", post(start_phase))
        .route("/sync/cancel", post(cancel_sync))
        .route("/sync/status", get(sync_status))
}
