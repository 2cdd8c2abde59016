/**
 * API Route Handlers
 *
 * Read-only HTTP endpoints next to the WebSocket.
 *
 * # Routes
 *
 * - `GET /health` - Liveness plus the number of open sockets
 * - `GET /api/users/{user_id}/status` - Online flag and last-seen time
 */

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::backend::error::BackendError;
use crate::backend::realtime::ChatHub;
use crate::backend::server::state::AppState;
use crate::shared::messaging::{PresenceStatus, UserId};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub connections: usize,
}

#[derive(Debug, Serialize)]
pub struct UserStatusResponse {
    pub user_id: UserId,
    pub status: PresenceStatus,
    pub online: bool,
    pub last_seen: Option<DateTime<Utc>>,
}

/// Configure API routes
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/health", get(health))
        .route("/api/users/{user_id}/status", get(user_status))
}

/// GET /health
pub async fn health(State(hub): State<Arc<ChatHub>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        connections: hub.registry().connection_count().await,
    })
}

/// GET /api/users/{user_id}/status
///
/// `online` comes from the connection registry, which is authoritative for
/// this process; `last_seen` comes from the store.
pub async fn user_status(
    State(hub): State<Arc<ChatHub>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<UserStatusResponse>, BackendError> {
    let user = hub.store().get_user(user_id).await?;
    let online = hub.is_online(user_id).await;
    Ok(Json(UserStatusResponse {
        user_id,
        status: PresenceStatus::from(online),
        online,
        last_seen: user.last_seen,
    }))
}
