//! Server Module
//!
//! Builds the application from an `AppConfig`.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs    - Module exports and documentation
//! ├── state.rs  - AppState and FromRef implementations
//! ├── config.rs - Database connection and store selection
//! └── init.rs   - App creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Store selection**: PostgreSQL when `DATABASE_URL` connects and
//!    migrates, otherwise the in-memory store
//! 2. **Seeding**: demo users and chats when `SEED_DEMO_DATA` is set
//! 3. **State creation**: the hub and shared config
//! 4. **Router creation**: routes, CORS and tracing layers

/// Application state management
pub mod state;

/// Store loading
pub mod config;

/// Server initialization
pub mod init;

pub use init::{create_app, create_app_with_store};
pub use state::AppState;
