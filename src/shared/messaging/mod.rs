//! Messaging Data Model
//!
//! Users, chats and messages as they travel between the store, the
//! connection registry and the wire.

pub mod chat;
pub mod message;
pub mod user;

/// Identifier of a user row
pub type UserId = i64;

/// Identifier of a chat row
pub type ChatId = i64;

/// Identifier of a message row
pub type MessageId = i64;

pub use chat::{Chat, ChatType, NewChat};
pub use message::{Message, MessageType, NewMessage, Reaction};
pub use user::{NewUser, PresenceStatus, User};
