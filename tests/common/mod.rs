//! Common test utilities and helpers
//!
//! - A seeded server on an ephemeral port
//! - WebSocket client helpers

pub mod server;
pub mod ws_client;

pub use server::*;
pub use ws_client::*;
