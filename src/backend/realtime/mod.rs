//! Real-time Module
//!
//! One WebSocket per online user, used for live message delivery, typing
//! indicators, read receipts and presence.
//!
//! # Architecture
//!
//! - **`registry`** - user id to live socket map and typing flags
//! - **`hub`** - connect/disconnect lifecycle and inbound event dispatch
//! - **`socket`** - per-socket reader loop, writer task and heartbeat
//! - **`handler`** - `GET /ws/{user_id}` upgrade with token check
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs      - Module exports and documentation
//! ├── registry.rs - ConnectionRegistry, Outbound, FanoutReport
//! ├── hub.rs      - ChatHub, HubError
//! ├── socket.rs   - serve_socket
//! └── handler.rs  - ws_upgrade
//! ```
//!
//! # Connection Lifecycle
//!
//! `Disconnected -> Connected -> Disconnected`. A user has at most one
//! registered socket; connecting again replaces the old one, which is closed
//! with code 4000. Messages for offline users are not queued: they are in the
//! store and can be fetched later.

/// Connection registry
pub mod registry;

/// Event dispatch and connection lifecycle
pub mod hub;

/// Per-socket task
pub mod socket;

/// WebSocket upgrade handler
pub mod handler;

pub use handler::ws_upgrade;
pub use hub::{ChatHub, HubError, InboundOutcome};
pub use registry::{
    ConnectionId, ConnectionRegistry, ConnectionSender, DeliveryOutcome, FanoutReport, Outbound,
};
pub use socket::Heartbeat;
