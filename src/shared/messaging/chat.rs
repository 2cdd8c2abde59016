//! Chat Data Structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{ChatId, UserId};
use crate::shared::SharedError;

/// Kind of conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChatType {
    /// One-to-one conversation between two friends
    Private,
    /// Named conversation with any number of members
    Group,
}

impl ChatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatType::Private => "private",
            ChatType::Group => "group",
        }
    }
}

impl FromStr for ChatType {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(ChatType::Private),
            "group" => Ok(ChatType::Group),
            other => Err(SharedError::validation(
                "chat_type",
                format!("Unknown chat type '{}'", other),
            )),
        }
    }
}

/// A conversation and its active participants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chat {
    pub id: ChatId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub chat_type: ChatType,
    pub created_by_id: UserId,
    pub is_active: bool,
    pub participants: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    pub last_message_at: Option<DateTime<Utc>>,
}

impl Chat {
    pub fn has_participant(&self, user_id: UserId) -> bool {
        self.participants.contains(&user_id)
    }
}

/// Fields needed to create a chat
///
/// `participant_ids` lists the members other than the creator, who is
/// always added as a member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewChat {
    pub name: Option<String>,
    pub description: Option<String>,
    pub chat_type: ChatType,
    pub created_by_id: UserId,
    pub participant_ids: Vec<UserId>,
}

impl NewChat {
    pub fn private(created_by_id: UserId, other: UserId) -> Self {
        Self {
            name: None,
            description: None,
            chat_type: ChatType::Private,
            created_by_id,
            participant_ids: vec![other],
        }
    }

    pub fn group(name: impl Into<String>, created_by_id: UserId, members: Vec<UserId>) -> Self {
        Self {
            name: Some(name.into()),
            description: None,
            chat_type: ChatType::Group,
            created_by_id,
            participant_ids: members,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Structural checks that need no store lookups
    ///
    /// Private chats name exactly one other user. The creator never appears
    /// in `participant_ids` and no id is listed twice.
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.participant_ids.contains(&self.created_by_id) {
            return Err(SharedError::validation(
                "participant_ids",
                "Creator is added automatically and must not be listed",
            ));
        }
        let mut seen = self.participant_ids.clone();
        seen.sort_unstable();
        seen.dedup();
        if seen.len() != self.participant_ids.len() {
            return Err(SharedError::validation(
                "participant_ids",
                "Duplicate participant",
            ));
        }
        if self.chat_type == ChatType::Private && self.participant_ids.len() != 1 {
            return Err(SharedError::validation(
                "participant_ids",
                "Private chat must have exactly 2 participants",
            ));
        }
        Ok(())
    }

    /// Creator followed by the listed participants
    pub fn all_members(&self) -> Vec<UserId> {
        std::iter::once(self.created_by_id)
            .chain(self.participant_ids.iter().copied())
            .collect()
    }
}
