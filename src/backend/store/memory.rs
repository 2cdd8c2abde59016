/**
 * In-Memory Chat Store
 *
 * Process-local implementation of [`ChatStore`]. Used when no database is
 * configured and as the store behind the unit and integration tests.
 *
 * All state lives behind one `std::sync::Mutex`; no method awaits while the
 * lock is held.
 */
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use super::{ChatStore, ConflictKind, StoreError};
use crate::shared::messaging::{
    Chat, ChatId, ChatType, Message, MessageId, NewChat, NewMessage, NewUser, Reaction, User,
    UserId,
};
use crate::shared::SharedError;

#[derive(Debug, Default)]
struct MemoryState {
    next_user_id: UserId,
    next_chat_id: ChatId,
    next_message_id: MessageId,
    users: BTreeMap<UserId, User>,
    chats: BTreeMap<ChatId, Chat>,
    messages: BTreeMap<MessageId, Message>,
    /// Unordered pairs stored as (smaller, larger)
    friendships: HashSet<(UserId, UserId)>,
}

impl MemoryState {
    fn user(&self, user_id: UserId) -> Result<&User, StoreError> {
        self.users
            .get(&user_id)
            .ok_or(StoreError::UserNotFound(user_id))
    }

    fn active_chat(&self, chat_id: ChatId) -> Result<&Chat, StoreError> {
        self.chats
            .get(&chat_id)
            .filter(|chat| chat.is_active)
            .ok_or(StoreError::ChatNotFound(chat_id))
    }

    fn are_friends(&self, a: UserId, b: UserId) -> bool {
        self.friendships.contains(&friend_pair(a, b))
    }

    fn private_chat_exists(&self, a: UserId, b: UserId) -> bool {
        self.chats.values().any(|chat| {
            chat.is_active
                && chat.chat_type == ChatType::Private
                && chat.has_participant(a)
                && chat.has_participant(b)
        })
    }
}

fn friend_pair(a: UserId, b: UserId) -> (UserId, UserId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// [`ChatStore`] backed by in-process maps
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn create_message(&self, message: NewMessage) -> Result<Message, StoreError> {
        message.validate()?;
        let mut state = self.lock()?;

        let chat = state.active_chat(message.chat_id)?;
        if !chat.has_participant(message.sender_id) {
            return Err(StoreError::NotParticipant {
                chat_id: message.chat_id,
                user_id: message.sender_id,
            });
        }
        if let Some(reply_id) = message.reply_to {
            let target_ok = state
                .messages
                .get(&reply_id)
                .is_some_and(|m| m.chat_id == message.chat_id && !m.is_deleted);
            if !target_ok {
                return Err(StoreError::ReplyNotFound(reply_id));
            }
        }

        state.next_message_id += 1;
        let now = Utc::now();
        let stored = Message {
            id: state.next_message_id,
            chat_id: message.chat_id,
            sender_id: message.sender_id,
            content: message.content,
            message_type: message.message_type,
            reply_to: message.reply_to,
            reactions: Vec::new(),
            is_edited: false,
            is_deleted: false,
            created_at: now,
            edited_at: None,
            deleted_at: None,
        };
        state.messages.insert(stored.id, stored.clone());
        if let Some(chat) = state.chats.get_mut(&message.chat_id) {
            chat.last_message_at = Some(now);
        }
        Ok(stored)
    }

    async fn get_chat_participants(&self, chat_id: ChatId) -> Result<Vec<UserId>, StoreError> {
        let state = self.lock()?;
        Ok(state.active_chat(chat_id)?.participants.clone())
    }

    async fn set_user_online(&self, user_id: UserId, online: bool) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or(StoreError::UserNotFound(user_id))?;
        user.is_online = online;
        user.last_seen = Some(Utc::now());
        Ok(())
    }

    async fn get_user(&self, user_id: UserId) -> Result<User, StoreError> {
        let state = self.lock()?;
        state.user(user_id).cloned()
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .users
            .values()
            .find(|user| user.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn list_messages(
        &self,
        chat_id: ChatId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>, StoreError> {
        let state = self.lock()?;
        state.active_chat(chat_id)?;
        Ok(state
            .messages
            .values()
            .rev()
            .filter(|m| m.chat_id == chat_id && !m.is_deleted)
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        user.validate()?;
        let mut state = self.lock()?;

        if state
            .users
            .values()
            .any(|u| u.username.eq_ignore_ascii_case(&user.username))
        {
            return Err(StoreError::Conflict(ConflictKind::UsernameTaken));
        }
        if state
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::Conflict(ConflictKind::EmailTaken));
        }

        state.next_user_id += 1;
        let created = User {
            id: state.next_user_id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            is_active: true,
            is_online: false,
            last_seen: None,
            created_at: Utc::now(),
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn befriend(&self, user_id: UserId, friend_id: UserId) -> Result<(), StoreError> {
        if user_id == friend_id {
            return Err(SharedError::validation("friend_id", "Cannot befriend yourself").into());
        }
        let mut state = self.lock()?;
        state.user(user_id)?;
        state.user(friend_id)?;
        if !state.friendships.insert(friend_pair(user_id, friend_id)) {
            return Err(StoreError::Conflict(ConflictKind::AlreadyFriends));
        }
        Ok(())
    }

    async fn create_chat(&self, chat: NewChat) -> Result<Chat, StoreError> {
        chat.validate()?;
        let mut state = self.lock()?;

        let members = chat.all_members();
        for member in &members {
            state.user(*member)?;
        }

        match chat.chat_type {
            ChatType::Private => {
                let (a, b) = (members[0], members[1]);
                if !state.are_friends(a, b) {
                    return Err(StoreError::NotFriends(a, b));
                }
                if state.private_chat_exists(a, b) {
                    return Err(StoreError::Conflict(ConflictKind::ChatAlreadyExists));
                }
            }
            ChatType::Group => {
                if chat.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
                    return Err(StoreError::InvalidChat(
                        "Group chat requires a name".to_string(),
                    ));
                }
            }
        }

        state.next_chat_id += 1;
        let created = Chat {
            id: state.next_chat_id,
            name: chat.name,
            description: chat.description,
            chat_type: chat.chat_type,
            created_by_id: chat.created_by_id,
            is_active: true,
            participants: members,
            created_at: Utc::now(),
            last_message_at: None,
        };
        state.chats.insert(created.id, created.clone());
        Ok(created)
    }

    async fn add_reaction(
        &self,
        message_id: MessageId,
        user_id: UserId,
        emoji: &str,
    ) -> Result<Message, StoreError> {
        if emoji.trim().is_empty() {
            return Err(SharedError::validation("emoji", "Emoji cannot be empty").into());
        }
        let mut state = self.lock()?;
        let chat_id = state
            .messages
            .get(&message_id)
            .filter(|m| !m.is_deleted)
            .map(|m| m.chat_id)
            .ok_or(StoreError::MessageNotFound(message_id))?;
        if !state.active_chat(chat_id)?.has_participant(user_id) {
            return Err(StoreError::NotParticipant { chat_id, user_id });
        }

        let message = state
            .messages
            .get_mut(&message_id)
            .ok_or(StoreError::MessageNotFound(message_id))?;
        if message
            .reactions
            .iter()
            .any(|r| r.user_id == user_id && r.emoji == emoji)
        {
            return Err(StoreError::Conflict(ConflictKind::DuplicateReaction));
        }
        message.reactions.push(Reaction {
            user_id,
            emoji: emoji.to_string(),
        });
        Ok(message.clone())
    }
}

impl MemoryStore {
    /// Every user, ordered by id
    pub fn users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.lock()?.users.values().cloned().collect())
    }

    /// Number of stored messages across all chats, deleted included
    pub fn message_count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.messages.len())
    }
}
