//! PostgreSQL Chat Store
//!
//! [`ChatStore`] over a sqlx `PgPool`. Queries are checked at runtime and
//! rows are mapped by column name. Schema lives in `migrations/`.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::collections::HashMap;

use super::{ChatStore, ConflictKind, StoreError};
use crate::shared::messaging::{
    Chat, ChatId, ChatType, Message, MessageId, NewChat, NewMessage, NewUser, Reaction, User,
    UserId,
};
use crate::shared::SharedError;

const USER_COLUMNS: &str =
    "id, username, email, full_name, is_active, is_online, last_seen, created_at";

const MESSAGE_COLUMNS: &str = "id, chat_id, sender_id, content, message_type, reply_to_id, \
     is_edited, is_deleted, created_at, edited_at, deleted_at";

/// [`ChatStore`] backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_chat(&self, chat_id: ChatId) -> Result<Chat, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, chat_type, created_by_id, is_active, created_at, last_message_at
            FROM chats
            WHERE id = $1 AND is_active
            "#,
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::ChatNotFound(chat_id))?;

        let participants = self.get_chat_participants(chat_id).await?;
        chat_from_row(&row, participants)
    }

    async fn reactions_for(
        &self,
        message_ids: &[MessageId],
    ) -> Result<HashMap<MessageId, Vec<Reaction>>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT message_id, user_id, emoji
            FROM message_reactions
            WHERE message_id = ANY($1)
            ORDER BY created_at
            "#,
        )
        .bind(message_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<MessageId, Vec<Reaction>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.get("message_id"))
                .or_default()
                .push(Reaction {
                    user_id: row.get("user_id"),
                    emoji: row.get("emoji"),
                });
        }
        Ok(grouped)
    }

    async fn load_message(&self, message_id: MessageId) -> Result<Message, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM messages WHERE id = $1 AND NOT is_deleted",
            MESSAGE_COLUMNS
        ))
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::MessageNotFound(message_id))?;

        let mut reactions = self.reactions_for(&[message_id]).await?;
        message_from_row(&row, reactions.remove(&message_id).unwrap_or_default())
    }
}

async fn ensure_participant(
    tx: &mut Transaction<'_, Postgres>,
    chat_id: ChatId,
    user_id: UserId,
) -> Result<(), StoreError> {
    let member: Option<bool> = sqlx::query_scalar(
        "SELECT is_active FROM chat_members WHERE chat_id = $1 AND user_id = $2",
    )
    .bind(chat_id)
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await?;

    match member {
        Some(true) => Ok(()),
        _ => Err(StoreError::NotParticipant { chat_id, user_id }),
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        full_name: row.get("full_name"),
        is_active: row.get("is_active"),
        is_online: row.get("is_online"),
        last_seen: row.get("last_seen"),
        created_at: row.get("created_at"),
    }
}

fn chat_from_row(row: &PgRow, participants: Vec<UserId>) -> Result<Chat, StoreError> {
    Ok(Chat {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        chat_type: row.get::<String, _>("chat_type").parse()?,
        created_by_id: row.get("created_by_id"),
        is_active: row.get("is_active"),
        participants,
        created_at: row.get("created_at"),
        last_message_at: row.get("last_message_at"),
    })
}

fn message_from_row(row: &PgRow, reactions: Vec<Reaction>) -> Result<Message, StoreError> {
    Ok(Message {
        id: row.get("id"),
        chat_id: row.get("chat_id"),
        sender_id: row.get("sender_id"),
        content: row.get("content"),
        message_type: row.get::<String, _>("message_type").parse()?,
        reply_to: row.get("reply_to_id"),
        reactions,
        is_edited: row.get("is_edited"),
        is_deleted: row.get("is_deleted"),
        created_at: row.get("created_at"),
        edited_at: row.get("edited_at"),
        deleted_at: row.get("deleted_at"),
    })
}

/// Map a unique-index violation to the matching conflict
fn conflict_from(err: sqlx::Error, fallback: ConflictKind) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            let kind = match db.constraint() {
                Some("users_username_key") => ConflictKind::UsernameTaken,
                Some("users_email_key") => ConflictKind::EmailTaken,
                _ => fallback,
            };
            StoreError::Conflict(kind)
        }
        _ => StoreError::Database(err),
    }
}

fn friend_pair(a: UserId, b: UserId) -> (UserId, UserId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[async_trait]
impl ChatStore for PgStore {
    async fn create_message(&self, message: NewMessage) -> Result<Message, StoreError> {
        message.validate()?;
        let mut tx = self.pool.begin().await?;

        let active: Option<bool> = sqlx::query_scalar("SELECT is_active FROM chats WHERE id = $1")
            .bind(message.chat_id)
            .fetch_optional(&mut *tx)
            .await?;
        if active != Some(true) {
            return Err(StoreError::ChatNotFound(message.chat_id));
        }
        ensure_participant(&mut tx, message.chat_id, message.sender_id).await?;

        if let Some(reply_id) = message.reply_to {
            let exists: Option<i64> = sqlx::query_scalar(
                "SELECT id FROM messages WHERE id = $1 AND chat_id = $2 AND NOT is_deleted",
            )
            .bind(reply_id)
            .bind(message.chat_id)
            .fetch_optional(&mut *tx)
            .await?;
            if exists.is_none() {
                return Err(StoreError::ReplyNotFound(reply_id));
            }
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO messages (chat_id, sender_id, content, message_type, reply_to_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(message.chat_id)
        .bind(message.sender_id)
        .bind(&message.content)
        .bind(message.message_type.as_str())
        .bind(message.reply_to)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE chats SET last_message_at = $1 WHERE id = $2")
            .bind(row.get::<chrono::DateTime<Utc>, _>("created_at"))
            .bind(message.chat_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        message_from_row(&row, Vec::new())
    }

    async fn get_chat_participants(&self, chat_id: ChatId) -> Result<Vec<UserId>, StoreError> {
        let active: Option<bool> = sqlx::query_scalar("SELECT is_active FROM chats WHERE id = $1")
            .bind(chat_id)
            .fetch_optional(&self.pool)
            .await?;
        if active != Some(true) {
            return Err(StoreError::ChatNotFound(chat_id));
        }

        let ids = sqlx::query_scalar(
            r#"
            SELECT user_id FROM chat_members
            WHERE chat_id = $1 AND is_active
            ORDER BY joined_at, user_id
            "#,
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn set_user_online(&self, user_id: UserId, online: bool) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE users SET is_online = $1, last_seen = NOW() WHERE id = $2")
                .bind(online)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::UserNotFound(user_id));
        }
        Ok(())
    }

    async fn get_user(&self, user_id: UserId) -> Result<User, StoreError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::UserNotFound(user_id))?;
        Ok(user_from_row(&row))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE LOWER(username) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn list_messages(
        &self,
        chat_id: ChatId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM messages
            WHERE chat_id = $1 AND NOT is_deleted
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(chat_id)
        .bind(limit.max(0))
        .bind(offset.max(0))
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<MessageId> = rows.iter().map(|row| row.get("id")).collect();
        let mut reactions = self.reactions_for(&ids).await?;
        rows.iter()
            .map(|row| {
                let id: MessageId = row.get("id");
                message_from_row(row, reactions.remove(&id).unwrap_or_default())
            })
            .collect()
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        user.validate()?;
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (username, email, full_name)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_from(e, ConflictKind::UsernameTaken))?;
        Ok(user_from_row(&row))
    }

    async fn befriend(&self, user_id: UserId, friend_id: UserId) -> Result<(), StoreError> {
        if user_id == friend_id {
            return Err(SharedError::validation("friend_id", "Cannot befriend yourself").into());
        }
        self.get_user(user_id).await?;
        self.get_user(friend_id).await?;

        let (low, high) = friend_pair(user_id, friend_id);
        sqlx::query("INSERT INTO friendships (user_id, friend_id) VALUES ($1, $2)")
            .bind(low)
            .bind(high)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_from(e, ConflictKind::AlreadyFriends))?;
        Ok(())
    }

    async fn create_chat(&self, chat: NewChat) -> Result<Chat, StoreError> {
        chat.validate()?;
        let members = chat.all_members();
        for member in &members {
            self.get_user(*member).await?;
        }

        let mut tx = self.pool.begin().await?;
        match chat.chat_type {
            ChatType::Private => {
                let (low, high) = friend_pair(members[0], members[1]);
                let friends: Option<i64> = sqlx::query_scalar(
                    "SELECT user_id FROM friendships WHERE user_id = $1 AND friend_id = $2 AND status = 'accepted'",
                )
                .bind(low)
                .bind(high)
                .fetch_optional(&mut *tx)
                .await?;
                if friends.is_none() {
                    return Err(StoreError::NotFriends(members[0], members[1]));
                }

                let existing: Option<i64> = sqlx::query_scalar(
                    r#"
                    SELECT c.id FROM chats c
                    JOIN chat_members a ON a.chat_id = c.id AND a.user_id = $1 AND a.is_active
                    JOIN chat_members b ON b.chat_id = c.id AND b.user_id = $2 AND b.is_active
                    WHERE c.chat_type = 'private' AND c.is_active
                    LIMIT 1
                    "#,
                )
                .bind(members[0])
                .bind(members[1])
                .fetch_optional(&mut *tx)
                .await?;
                if existing.is_some() {
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

        let chat_id: ChatId = sqlx::query_scalar(
            r#"
            INSERT INTO chats (name, description, chat_type, created_by_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&chat.name)
        .bind(&chat.description)
        .bind(chat.chat_type.as_str())
        .bind(chat.created_by_id)
        .fetch_one(&mut *tx)
        .await?;

        for member in &members {
            sqlx::query("INSERT INTO chat_members (chat_id, user_id) VALUES ($1, $2)")
                .bind(chat_id)
                .bind(member)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::info!("[Store] Created {} chat {}", chat.chat_type.as_str(), chat_id);
        self.load_chat(chat_id).await
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
        let message = self.load_message(message_id).await?;

        let mut tx = self.pool.begin().await?;
        ensure_participant(&mut tx, message.chat_id, user_id).await?;
        sqlx::query(
            "INSERT INTO message_reactions (message_id, user_id, emoji) VALUES ($1, $2, $3)",
        )
        .bind(message_id)
        .bind(user_id)
        .bind(emoji)
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_from(e, ConflictKind::DuplicateReaction))?;
        tx.commit().await?;

        self.load_message(message_id).await
    }
}
