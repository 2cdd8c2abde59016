//! Demo Data
//!
//! Populates a store with five demo users, a few friendships, a private chat
//! between alice and bob and a group chat with a welcome message. Enabled
//! with `SEED_DEMO_DATA=true`.
//!
//! Running it again is harmless: every conflict the store reports is logged
//! and skipped, and the chats are only created on the first run.

use crate::backend::auth::create_token;
use crate::backend::store::{ChatStore, StoreError};
use crate::shared::messaging::{ChatId, NewChat, NewMessage, NewUser, User, UserId};

/// (username, email, full name)
pub const DEMO_USERS: [(&str, &str, &str); 5] = [
    ("alice", "alice@example.com", "Alice Johnson"),
    ("bob", "bob@example.com", "Bob Smith"),
    ("charlie", "charlie@example.com", "Charlie Brown"),
    ("diana", "diana@example.com", "Diana Prince"),
    ("eve", "eve@example.com", "Eve Wilson"),
];

/// Pairs of indexes into [`DEMO_USERS`]
const DEMO_FRIENDSHIPS: [(usize, usize); 5] = [(0, 1), (0, 2), (1, 2), (0, 3), (3, 4)];

/// What a seeding run produced
#[derive(Debug, Clone, Default)]
pub struct SeedReport {
    /// Demo users, in [`DEMO_USERS`] order, whether new or pre-existing
    pub users: Vec<User>,
    /// Chats created by this run
    pub chats: Vec<ChatId>,
    /// Development tokens keyed by username
    pub tokens: Vec<(String, String)>,
}

impl SeedReport {
    pub fn user_id(&self, username: &str) -> Option<UserId> {
        self.users
            .iter()
            .find(|user| user.username == username)
            .map(|user| user.id)
    }
}

/// Treat a conflict as "already there"
fn skip_conflict<T>(result: Result<T, StoreError>, what: &str) -> Result<Option<T>, StoreError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(StoreError::Conflict(kind)) => {
            tracing::info!("[Seed] Skipping {}: {}", what, kind);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Insert the demo data set
pub async fn seed_demo_data(
    store: &dyn ChatStore,
    jwt_secret: &str,
) -> Result<SeedReport, StoreError> {
    let mut report = SeedReport::default();

    for (username, email, full_name) in DEMO_USERS {
        let user = match store.find_user_by_username(username).await? {
            Some(existing) => existing,
            None => store
                .create_user(NewUser::new(username, email, full_name))
                .await?,
        };
        report.users.push(user);
    }

    let ids: Vec<UserId> = report.users.iter().map(|user| user.id).collect();
    for (a, b) in DEMO_FRIENDSHIPS {
        let what = format!("friendship {}-{}", DEMO_USERS[a].0, DEMO_USERS[b].0);
        skip_conflict(store.befriend(ids[a], ids[b]).await, &what)?;
    }

    let private = skip_conflict(
        store.create_chat(NewChat::private(ids[0], ids[1])).await,
        "private chat alice-bob",
    )?;

    if let Some(private) = private {
        report.chats.push(private.id);

        let group = store
            .create_chat(
                NewChat::group("Demo Team", ids[0], vec![ids[1], ids[2], ids[3]])
                    .with_description("Say hello to the team"),
            )
            .await?;
        report.chats.push(group.id);

        let welcome = store
            .create_message(NewMessage::text(
                group.id,
                ids[0],
                "Welcome to the demo team! 👋",
                None,
            ))
            .await?;
        skip_conflict(
            store.add_reaction(welcome.id, ids[1], "🎉").await,
            "welcome reaction",
        )?;
        store
            .create_message(NewMessage::text(private.id, ids[1], "Hey Alice!", None))
            .await?;
    }

    for user in &report.users {
        match create_token(jwt_secret, user.id, Some(user.username.clone())) {
            Ok(token) => {
                tracing::info!("[Seed] Dev token for {} (id {}): {}", user.username, user.id, token);
                report.tokens.push((user.username.clone(), token));
            }
            Err(e) => tracing::warn!("[Seed] Could not mint token for {}: {}", user.username, e),
        }
    }

    tracing::info!(
        users = report.users.len(),
        chats = report.chats.len(),
        "[Seed] Demo data ready"
    );
    Ok(report)
}
