//! Route Configuration Module
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs        - Module exports and documentation
//! ├── router.rs     - Router assembly, CORS and tracing layers
//! └── api_routes.rs - Health and user status handlers
//! ```
//!
//! The WebSocket upgrade handler lives in `backend::realtime::handler`.

/// Main router creation
pub mod router;

/// API endpoint handlers
pub mod api_routes;

pub use router::create_router;
