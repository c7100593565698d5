//! Control API
//!
//! Thin HTTP surface over the scheduler and the transaction store:
//!
//! - `GET  /status`: current [`ServiceStatus`](crate::sync::ServiceStatus) snapshot
//! - `POST /trigger`: enqueue a manual sync cycle (idempotent)
//! - `POST /shutdown`: acknowledge, then signal graceful termination
//! - `GET  /transactions/:client_id`: persisted records, newest first
//! - `GET  /health`: database connectivity probe

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::db;
use crate::sync::SyncScheduler;

/// How long the shutdown handler waits before signalling the scheduler, so
/// the 200 response flushes first.
const SHUTDOWN_ACK_DELAY: Duration = Duration::from_millis(100);

/// State shared with every handler.
#[derive(Clone)]
pub struct ApiState {
    pub db: PgPool,
    pub scheduler: Arc<SyncScheduler>,
}

/// Build the control API router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/trigger", post(trigger_sync))
        .route("/shutdown", post(shutdown_service))
        .route("/transactions/:client_id", get(transactions_by_client))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Status snapshot; reads only the tracker lock, never waits for a cycle.
async fn get_status(State(state): State<ApiState>) -> impl IntoResponse {
    Json(state.scheduler.status_snapshot())
}

/// Enqueue a manual cycle. Always 200: a duplicate trigger coalesces into
/// the pending one instead of erroring.
async fn trigger_sync(State(state): State<ApiState>) -> impl IntoResponse {
    state.scheduler.request_sync();
    info!("Manual sync requested via API");

    Json(json!({
        "status": "success",
        "message": "Sync triggered"
    }))
}

/// Acknowledge, then signal the scheduler after a short delay. The process
/// exits once the loop observes the signal between cycles.
async fn shutdown_service(State(state): State<ApiState>) -> impl IntoResponse {
    info!("Shutdown requested via API");

    let scheduler = state.scheduler.clone();
    tokio::spawn(async move {
        tokio::time::sleep(SHUTDOWN_ACK_DELAY).await;
        scheduler.shutdown();
    });

    Json(json!({
        "status": "success",
        "message": "Service is shutting down"
    }))
}

/// All persisted transactions for one client, ordered by transaction
/// timestamp descending. A client with no records gets an empty array, not
/// a 404.
async fn transactions_by_client(
    State(state): State<ApiState>,
    Path(client_id): Path<String>,
) -> Result<Response, StatusCode> {
    match db::transactions::by_client(&state.db, &client_id).await {
        Ok(records) => Ok((StatusCode::OK, Json(records)).into_response()),
        Err(e) => {
            tracing::error!(client_id = %client_id, error = ?e, "Failed to query transactions");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        },
    }
}

/// Database connectivity probe
async fn health_check(State(state): State<ApiState>) -> Result<Response, StatusCode> {
    match db::health_check(&state.db).await {
        Ok(()) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        )
            .into_response()),
        Err(e) => {
            tracing::error!(error = ?e, "Database health check failed");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        },
    }
}
