//! Persistence Layer
//!
//! The [`ChatStore`] trait is everything the real-time hub and the HTTP
//! layer need from storage. Two implementations ship with the server:
//!
//! - [`PgStore`] - PostgreSQL through sqlx, used when `DATABASE_URL` is set
//! - [`MemoryStore`] - process-local maps, used otherwise and in tests
//!
//! Both enforce the same rules (participant checks, friendship for private
//! chats, uniqueness) and report them with the same [`StoreError`] values.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::shared::messaging::{
    Chat, ChatId, Message, MessageId, NewChat, NewMessage, NewUser, User, UserId,
};
use crate::shared::SharedError;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Default page size for message history
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Storage operations used by the chat server
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Persist a message after checking the chat, the sender's membership
    /// and the reply target. Updates the chat's `last_message_at`.
    async fn create_message(&self, message: NewMessage) -> Result<Message, StoreError>;

    /// Active participants of an active chat
    async fn get_chat_participants(&self, chat_id: ChatId) -> Result<Vec<UserId>, StoreError>;

    /// Set the online flag and stamp `last_seen`
    async fn set_user_online(&self, user_id: UserId, online: bool) -> Result<(), StoreError>;

    async fn get_user(&self, user_id: UserId) -> Result<User, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Non-deleted messages of a chat, newest first
    async fn list_messages(
        &self,
        chat_id: ChatId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>, StoreError>;

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Record an accepted friendship between two users
    async fn befriend(&self, user_id: UserId, friend_id: UserId) -> Result<(), StoreError>;

    async fn create_chat(&self, chat: NewChat) -> Result<Chat, StoreError>;

    /// Attach an emoji reaction and return the updated message
    async fn add_reaction(
        &self,
        message_id: MessageId,
        user_id: UserId,
        emoji: &str,
    ) -> Result<Message, StoreError>;
}

/// Uniqueness rule that a write would break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    AlreadyFriends,
    ChatAlreadyExists,
    DuplicateReaction,
    UsernameTaken,
    EmailTaken,
}

impl ConflictKind {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ConflictKind::AlreadyFriends => "already_friends",
            ConflictKind::ChatAlreadyExists => "chat_already_exists",
            ConflictKind::DuplicateReaction => "duplicate_reaction",
            ConflictKind::UsernameTaken => "username_taken",
            ConflictKind::EmailTaken => "email_taken",
        }
    }
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ConflictKind::AlreadyFriends => "Users are already friends",
            ConflictKind::ChatAlreadyExists => "Chat already exists",
            ConflictKind::DuplicateReaction => "Reaction already added",
            ConflictKind::UsernameTaken => "Username already registered",
            ConflictKind::EmailTaken => "Email already registered",
        };
        f.write_str(text)
    }
}

/// Errors raised by [`ChatStore`] implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Chat {0} not found")]
    ChatNotFound(ChatId),

    #[error("User {0} not found")]
    UserNotFound(UserId),

    #[error("Message {0} not found")]
    MessageNotFound(MessageId),

    #[error("User {user_id} is not a participant of chat {chat_id}")]
    NotParticipant { chat_id: ChatId, user_id: UserId },

    #[error("Reply target {0} not found in this chat")]
    ReplyNotFound(MessageId),

    #[error("Users {0} and {1} are not friends")]
    NotFriends(UserId, UserId),

    #[error("{0}")]
    Conflict(ConflictKind),

    #[error("Invalid chat: {0}")]
    InvalidChat(String),

    #[error(transparent)]
    Invalid(#[from] SharedError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Stable machine-readable code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::ChatNotFound(_) => "chat_not_found",
            StoreError::UserNotFound(_) => "user_not_found",
            StoreError::MessageNotFound(_) => "message_not_found",
            StoreError::NotParticipant { .. } => "not_participant",
            StoreError::ReplyNotFound(_) => "reply_not_found",
            StoreError::NotFriends(..) => "not_friends",
            StoreError::Conflict(kind) => kind.code(),
            StoreError::InvalidChat(_) => "invalid_chat",
            StoreError::Invalid(err) => err.code(),
            StoreError::Database(_) | StoreError::Unavailable(_) => "store_unavailable",
        }
    }

    /// Lookup failures that map to 404 over HTTP
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::ChatNotFound(_)
                | StoreError::UserNotFound(_)
                | StoreError::MessageNotFound(_)
                | StoreError::ReplyNotFound(_)
        )
    }
}
