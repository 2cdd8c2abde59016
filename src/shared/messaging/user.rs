//! User Data Structure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;
use crate::shared::SharedError;

/// A registered user
///
/// `is_online` and `last_seen` are owned by the connection registry: they
/// change only when a socket connects or disconnects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub is_online: bool,
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            full_name: full_name.into(),
        }
    }

    /// Validate username and display name lengths
    ///
    /// Usernames are 3-30 characters, display names 2-100.
    pub fn validate(&self) -> Result<(), SharedError> {
        let username_len = self.username.chars().count();
        if !(3..=30).contains(&username_len) {
            return Err(SharedError::validation(
                "username",
                "Username must be 3-30 characters",
            ));
        }
        let name_len = self.full_name.chars().count();
        if !(2..=100).contains(&name_len) {
            return Err(SharedError::validation(
                "full_name",
                "Full name must be 2-100 characters",
            ));
        }
        if !self.email.contains('@') {
            return Err(SharedError::validation("email", "Invalid email format"));
        }
        Ok(())
    }
}

/// Presence broadcast to other connected users
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    Online,
    Offline,
}

impl From<bool> for PresenceStatus {
    fn from(online: bool) -> Self {
        if online {
            Self::Online
        } else {
            Self::Offline
        }
    }
}
