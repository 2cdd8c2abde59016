/**
 * Application State Management
 *
 * The `AppState` struct is the state container handed to every Axum
 * handler. It holds the chat hub (connection registry plus store) and the
 * runtime configuration.
 *
 * # State Extraction
 *
 * The `FromRef` implementations allow handlers to extract only the part
 * they need, e.g. `State<Arc<ChatHub>>`.
 *
 * # Example
 *
 * ```rust
 * use chatapp::backend::server::state::AppState;
 * use chatapp::backend::store::MemoryStore;
 * use chatapp::shared::AppConfig;
 * use std::sync::Arc;
 *
 * let state = AppState::new(Arc::new(MemoryStore::new()), AppConfig::default());
 * assert!(state.config.require_auth);
 * ```
 */

use axum::extract::FromRef;
use std::sync::Arc;

use crate::backend::realtime::ChatHub;
use crate::backend::store::ChatStore;
use crate::shared::AppConfig;

/// Shared state for all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Connection registry and store
    pub hub: Arc<ChatHub>,
    /// Runtime configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn ChatStore>, config: AppConfig) -> Self {
        Self {
            hub: Arc::new(ChatHub::new(store)),
            config: Arc::new(config),
        }
    }

    pub fn store(&self) -> &Arc<dyn ChatStore> {
        self.hub.store()
    }
}

impl FromRef<AppState> for Arc<ChatHub> {
    fn from_ref(state: &AppState) -> Self {
        state.hub.clone()
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
