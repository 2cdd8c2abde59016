/**
 * Real-time Event Protocol
 *
 * JSON text frames exchanged over the chat WebSocket. Every frame is an
 * object carrying a `type` tag; the remaining fields depend on the tag.
 *
 * Client to server: `send_message`, `typing`, `join_chat`, `leave_chat`,
 * `message_read`.
 *
 * Server to client: `message`, `typing`, `join_success`, `leave_success`,
 * `message_read`, `user_status`, `error`.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::messaging::message::validate_content;
use crate::shared::messaging::{ChatId, Message, MessageId, PresenceStatus, UserId};
use crate::shared::SharedError;

/// Frame sent by a connected client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Persist a message and deliver it to every participant
    SendMessage {
        chat_id: ChatId,
        content: String,
        #[serde(default, alias = "reply_to_message_id")]
        reply_to: Option<MessageId>,
    },
    /// Start or stop the typing indicator in a chat
    Typing {
        chat_id: ChatId,
        #[serde(default)]
        is_typing: bool,
    },
    /// Acknowledged only; membership lives in the store
    JoinChat { chat_id: ChatId },
    /// Acknowledged only; clears this user's typing state in the chat
    LeaveChat { chat_id: ChatId },
    /// Read receipt relayed to the other participants
    MessageRead {
        chat_id: ChatId,
        message_id: MessageId,
    },
}

impl ClientEvent {
    /// Decode and validate a text frame
    ///
    /// Malformed JSON, an unknown `type`, a missing field and a blank
    /// `send_message` body all map to [`SharedError::InvalidEvent`] or
    /// [`SharedError::ValidationError`], both reported as `invalid_event`.
    pub fn parse(text: &str) -> Result<Self, SharedError> {
        let event: ClientEvent =
            serde_json::from_str(text).map_err(|e| SharedError::invalid_event(e.to_string()))?;
        if let ClientEvent::SendMessage { content, .. } = &event {
            validate_content(content)?;
        }
        Ok(event)
    }

    /// Wire tag of this event
    pub fn kind(&self) -> &'static str {
        match self {
            ClientEvent::SendMessage { .. } => "send_message",
            ClientEvent::Typing { .. } => "typing",
            ClientEvent::JoinChat { .. } => "join_chat",
            ClientEvent::LeaveChat { .. } => "leave_chat",
            ClientEvent::MessageRead { .. } => "message_read",
        }
    }

    pub fn chat_id(&self) -> ChatId {
        match self {
            ClientEvent::SendMessage { chat_id, .. }
            | ClientEvent::Typing { chat_id, .. }
            | ClientEvent::JoinChat { chat_id }
            | ClientEvent::LeaveChat { chat_id }
            | ClientEvent::MessageRead { chat_id, .. } => *chat_id,
        }
    }
}

/// Frame pushed to a connected client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A newly persisted message
    Message(Message),
    Typing {
        chat_id: ChatId,
        user_id: UserId,
        is_typing: bool,
        timestamp: DateTime<Utc>,
    },
    JoinSuccess { chat_id: ChatId },
    LeaveSuccess { chat_id: ChatId },
    MessageRead {
        chat_id: ChatId,
        message_id: MessageId,
        reader_id: UserId,
        timestamp: DateTime<Utc>,
    },
    /// Presence change of another user
    UserStatus {
        user_id: UserId,
        status: PresenceStatus,
        timestamp: DateTime<Utc>,
    },
    /// Sent only to the originating connection
    Error { code: String, message: String },
}

impl ServerEvent {
    pub fn typing(chat_id: ChatId, user_id: UserId, is_typing: bool) -> Self {
        Self::Typing {
            chat_id,
            user_id,
            is_typing,
            timestamp: Utc::now(),
        }
    }

    pub fn message_read(chat_id: ChatId, message_id: MessageId, reader_id: UserId) -> Self {
        Self::MessageRead {
            chat_id,
            message_id,
            reader_id,
            timestamp: Utc::now(),
        }
    }

    pub fn user_status(user_id: UserId, status: PresenceStatus) -> Self {
        Self::UserStatus {
            user_id,
            status,
            timestamp: Utc::now(),
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Wire tag of this event
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::Message(_) => "message",
            ServerEvent::Typing { .. } => "typing",
            ServerEvent::JoinSuccess { .. } => "join_success",
            ServerEvent::LeaveSuccess { .. } => "leave_success",
            ServerEvent::MessageRead { .. } => "message_read",
            ServerEvent::UserStatus { .. } => "user_status",
            ServerEvent::Error { .. } => "error",
        }
    }

    /// Encode as a JSON text frame
    pub fn to_json(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }
}
