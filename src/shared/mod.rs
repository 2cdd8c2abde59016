//! Shared Module
//!
//! Types shared by every layer of the chat server: the data model that the
//! store persists, the JSON events exchanged over the WebSocket, runtime
//! configuration and the validation errors they raise.
//!
//! # Overview
//!
//! Nothing in here performs I/O. The backend owns sockets, the database
//! and the connection registry; this module only describes the data.

/// Real-time event protocol
pub mod event;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Users, chats and messages
pub mod messaging;

/// Re-export commonly used types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use error::SharedError;
pub use event::{ClientEvent, ServerEvent};
pub use messaging::{ChatId, MessageId, UserId};
