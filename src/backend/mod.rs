//! Backend Module
//!
//! Server-side code for the chat backend: an Axum HTTP server with a
//! WebSocket endpoint per user, a connection registry that fans events out
//! to chat participants, and a pluggable persistence layer.
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs     - Module exports and documentation
//! ├── server/    - Application state, store selection, app creation
//! ├── routes/    - Router assembly and HTTP handlers
//! ├── realtime/  - Connection registry, event hub, socket tasks
//! ├── store/     - ChatStore trait with PostgreSQL and in-memory backends
//! ├── auth/      - JWT session tokens
//! ├── error/     - Backend error type and HTTP conversion
//! └── seed.rs    - Demo data
//! ```
//!
//! # State Management
//!
//! `AppState` holds an `Arc<ChatHub>` and the `AppConfig`. The hub owns the
//! registry (one live socket per user) and an `Arc<dyn ChatStore>`. Every
//! message is persisted before it is broadcast.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Real-time connection handling
pub mod realtime;

/// Persistence
pub mod store;

/// Backend error types
pub mod error;

/// Authentication
pub mod auth;

/// Demo data seeding
pub mod seed;

pub use error::BackendError;
pub use realtime::ChatHub;
pub use server::create_app;
pub use store::{ChatStore, MemoryStore, PgStore, StoreError};
