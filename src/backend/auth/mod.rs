//! Authentication Module
//!
//! Bearer-token verification for the WebSocket upgrade.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs      - Module exports and documentation
//! └── sessions.rs - JWT creation and verification
//! ```
//!
//! Clients pass the token as `?token=<JWT>` because browsers cannot set
//! headers on a WebSocket handshake. The token's `sub` claim must equal the
//! user id in the upgrade path.

/// JWT token management
pub mod sessions;

pub use sessions::{create_token, user_id_from_token, verify_token, AuthError, Claims};
