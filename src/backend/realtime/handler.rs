//! WebSocket upgrade endpoint

use axum::{
    extract::{ws::WebSocketUpgrade, Path, Query, State},
    response::Response,
};
use serde::Deserialize;

use super::socket::{serve_socket, Heartbeat};
use crate::backend::auth::user_id_from_token;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::messaging::UserId;

/// Query parameters for the WebSocket upgrade
#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// GET /ws/{user_id}?token=JWT
///
/// Rejections happen before the upgrade, so no registry state changes:
/// - 401 when auth is required and the token is missing, invalid or names
///   another user
/// - 404 when the user does not exist
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, BackendError> {
    if state.config.require_auth {
        authorize(&state.config.jwt_secret, user_id, query.token.as_deref())?;
    }

    state.hub.store().get_user(user_id).await?;

    let hub = state.hub.clone();
    let heartbeat = Heartbeat::from(state.config.as_ref());
    Ok(ws.on_upgrade(move |socket| serve_socket(socket, hub, user_id, heartbeat)))
}

fn authorize(secret: &str, user_id: UserId, token: Option<&str>) -> Result<(), BackendError> {
    let token = token.ok_or_else(|| {
        tracing::warn!("[Realtime] Upgrade for user {} without token", user_id);
        BackendError::unauthorized("Missing token")
    })?;

    let token_user = user_id_from_token(secret, token).map_err(|e| {
        tracing::warn!("[Realtime] Rejected token for user {}: {}", user_id, e);
        BackendError::unauthorized("Invalid token")
    })?;

    if token_user != user_id {
        tracing::warn!(
            "[Realtime] Token for user {} used to connect as {}",
            token_user,
            user_id
        );
        return Err(BackendError::unauthorized("Token does not match user"));
    }
    Ok(())
}
