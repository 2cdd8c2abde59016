//! Chat backend library
//!
//! Real-time messaging over WebSockets with persisted history.
//!
//! - **`shared`** - Wire events, domain types, configuration and errors
//! - **`backend`** - Axum server, realtime hub, stores and auth
//!
//! ```rust,no_run
//! use chatapp::backend::server::create_app;
//! use chatapp::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let app = create_app(config).await;
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
