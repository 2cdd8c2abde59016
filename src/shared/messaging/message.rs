//! Message Data Structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{ChatId, MessageId, UserId};
use crate::shared::SharedError;

/// Longest message body accepted, in characters
pub const MAX_CONTENT_CHARS: usize = 10_000;

/// Content kind of a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    Video,
    Audio,
    Voice,
    Document,
    Location,
    Contact,
    Sticker,
    System,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::Image => "image",
            MessageType::Video => "video",
            MessageType::Audio => "audio",
            MessageType::Voice => "voice",
            MessageType::Document => "document",
            MessageType::Location => "location",
            MessageType::Contact => "contact",
            MessageType::Sticker => "sticker",
            MessageType::System => "system",
        }
    }
}

impl FromStr for MessageType {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "text" => MessageType::Text,
            "image" => MessageType::Image,
            "video" => MessageType::Video,
            "audio" => MessageType::Audio,
            "voice" => MessageType::Voice,
            "document" => MessageType::Document,
            "location" => MessageType::Location,
            "contact" => MessageType::Contact,
            "sticker" => MessageType::Sticker,
            "system" => MessageType::System,
            other => {
                return Err(SharedError::validation(
                    "message_type",
                    format!("Unknown message type '{}'", other),
                ))
            }
        })
    }
}

/// One emoji reaction; a user holds at most one per emoji per message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reaction {
    pub user_id: UserId,
    pub emoji: String,
}

/// A persisted chat message
///
/// This is also the payload of the outbound `message` event, so every field
/// here is visible to chat participants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub sender_id: UserId,
    pub content: String,
    pub message_type: MessageType,
    pub reply_to: Option<MessageId>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub is_edited: bool,
    #[serde(default)]
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub edited_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A message that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub chat_id: ChatId,
    pub sender_id: UserId,
    pub content: String,
    pub message_type: MessageType,
    pub reply_to: Option<MessageId>,
}

impl NewMessage {
    /// Plain text message, the only kind clients send over the socket
    pub fn text(
        chat_id: ChatId,
        sender_id: UserId,
        content: impl Into<String>,
        reply_to: Option<MessageId>,
    ) -> Self {
        Self {
            chat_id,
            sender_id,
            content: content.into(),
            message_type: MessageType::Text,
            reply_to,
        }
    }

    pub fn system(chat_id: ChatId, sender_id: UserId, content: impl Into<String>) -> Self {
        Self {
            message_type: MessageType::System,
            ..Self::text(chat_id, sender_id, content, None)
        }
    }

    pub fn validate(&self) -> Result<(), SharedError> {
        validate_content(&self.content)
    }
}

/// Reject blank or oversized message bodies
pub fn validate_content(content: &str) -> Result<(), SharedError> {
    if content.trim().is_empty() {
        return Err(SharedError::validation(
            "content",
            "Message content cannot be empty",
        ));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(SharedError::validation(
            "content",
            format!("Message content exceeds {} characters", MAX_CONTENT_CHARS),
        ));
    }
    Ok(())
}
