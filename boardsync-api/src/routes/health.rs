/// Liveness probe
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// Reports process liveness, database connectivity, and how many board
/// rooms currently have live subscribers.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::Serialize;

/// Overall service status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// Serving traffic, database reachable
    Healthy,

    /// Serving traffic, database unreachable
    Degraded,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status
    pub status: ServiceStatus,

    /// Application version
    pub version: &'static str,

    /// Whether the database answered a probe query
    pub database_ok: bool,

    /// Boards with at least one live realtime subscriber
    pub active_rooms: usize,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database_ok = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();
    let active_rooms = state.rooms.room_count().await;

    Ok(Json(HealthResponse {
        status: if database_ok {
            ServiceStatus::Healthy
        } else {
            ServiceStatus::Degraded
        },
        version: env!("CARGO_PKG_VERSION"),
        database_ok,
        active_rooms,
    }))
}
