/**
 * Server Initialization
 *
 * Builds the application state and router from an `AppConfig`.
 *
 * # Initialization Process
 *
 * 1. Select the store (PostgreSQL or in-memory)
 * 2. Seed demo data when configured
 * 3. Create the hub and shared state
 * 4. Create the router
 */

use axum::Router;
use std::sync::Arc;

use crate::backend::routes::router::create_router;
use crate::backend::seed::seed_demo_data;
use crate::backend::server::config::load_store;
use crate::backend::server::state::AppState;
use crate::backend::store::ChatStore;
use crate::shared::AppConfig;

/// Create and configure the Axum application
///
/// Seeding failures are logged and do not prevent startup.
pub async fn create_app(config: AppConfig) -> Router<()> {
    tracing::info!("[Server] Initializing chat backend");

    let store = load_store(&config).await;

    if config.seed_demo_data {
        if let Err(e) = seed_demo_data(store.as_ref(), &config.jwt_secret).await {
            tracing::error!("[Server] Failed to seed demo data: {}", e);
        }
    }

    let (app, _) = create_app_with_store(store, config);
    app
}

/// Build the router over an existing store
///
/// Returns the state as well so callers (tests, mostly) can reach the hub.
pub fn create_app_with_store(store: Arc<dyn ChatStore>, config: AppConfig) -> (Router<()>, AppState) {
    if config.uses_dev_secret() {
        tracing::warn!("[Server] JWT_SECRET not set; using the development secret");
    }
    if !config.require_auth {
        tracing::warn!("[Server] REQUIRE_AUTH is off; any client can connect as any user");
    }

    let state = AppState::new(store, config);
    let app = create_router(state.clone());
    tracing::info!("[Server] Router configured");
    (app, state)
}
