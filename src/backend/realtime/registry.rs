/**
 * Connection Registry
 *
 * Process-local map from user id to that user's one live socket, plus the
 * typing flags currently raised in each chat.
 *
 * Every socket is represented by the sending half of an unbounded channel
 * drained by the socket's writer task. Pushing onto the channel never
 * blocks, so the registry lock is never held across network I/O. A push
 * fails only when the writer task has exited, which the registry treats as
 * a failed write: the entry is removed on the spot.
 */
use std::collections::{HashMap, HashSet};
use std::fmt;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use crate::shared::messaging::{ChatId, UserId};
use crate::shared::ServerEvent;

/// Close code sent to a socket that was replaced by a newer connection
pub const CLOSE_REPLACED: u16 = 4000;

/// Normal closure code
pub const CLOSE_NORMAL: u16 = 1000;

/// Frames queued for a socket's writer task
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Event(ServerEvent),
    /// Send a close frame and stop writing
    Close { code: u16, reason: String },
}

/// Sending half held by the registry for each live socket
pub type ConnectionSender = mpsc::UnboundedSender<Outbound>;

/// Receiving half drained by the socket's writer task
pub type ConnectionReceiver = mpsc::UnboundedReceiver<Outbound>;

/// Identity of one accepted socket
///
/// A user reconnecting gets a fresh id, which lets a late teardown from the
/// old socket be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Result of pushing one event to one recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Queued on the recipient's live socket
    Delivered,
    /// Recipient has no live socket; nothing is queued for later
    Offline,
    /// The socket's writer is gone; its entry was removed
    Failed,
}

/// Per-recipient outcomes of one fan-out, in recipient order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanoutReport {
    pub outcomes: Vec<(UserId, DeliveryOutcome)>,
}

impl FanoutReport {
    fn with(&self, wanted: DeliveryOutcome) -> Vec<UserId> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome == wanted)
            .map(|(user_id, _)| *user_id)
            .collect()
    }

    pub fn delivered(&self) -> Vec<UserId> {
        self.with(DeliveryOutcome::Delivered)
    }

    pub fn offline(&self) -> Vec<UserId> {
        self.with(DeliveryOutcome::Offline)
    }

    pub fn failed(&self) -> Vec<UserId> {
        self.with(DeliveryOutcome::Failed)
    }

    pub fn outcome(&self, user_id: UserId) -> Option<DeliveryOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| *id == user_id)
            .map(|(_, outcome)| *outcome)
    }
}

#[derive(Debug)]
struct ConnectionHandle {
    id: ConnectionId,
    sender: ConnectionSender,
}

#[derive(Debug, Default)]
struct RegistryState {
    connections: HashMap<UserId, ConnectionHandle>,
    typing: HashMap<ChatId, HashSet<UserId>>,
}

impl RegistryState {
    fn deliver(&mut self, user_id: UserId, event: &ServerEvent) -> DeliveryOutcome {
        let Some(handle) = self.connections.get(&user_id) else {
            return DeliveryOutcome::Offline;
        };
        if handle.sender.send(Outbound::Event(event.clone())).is_ok() {
            DeliveryOutcome::Delivered
        } else {
            self.connections.remove(&user_id);
            DeliveryOutcome::Failed
        }
    }
}

/// Live sockets and typing flags behind one async mutex
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    state: Mutex<RegistryState>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a socket, returning the sender it replaced, if any
    pub async fn insert(
        &self,
        user_id: UserId,
        id: ConnectionId,
        sender: ConnectionSender,
    ) -> Option<ConnectionSender> {
        let mut state = self.state.lock().await;
        state
            .connections
            .insert(user_id, ConnectionHandle { id, sender })
            .map(|previous| previous.sender)
    }

    /// Remove the user's entry, whichever socket it belongs to
    pub async fn remove(&self, user_id: UserId) -> Option<ConnectionSender> {
        let mut state = self.state.lock().await;
        state.connections.remove(&user_id).map(|handle| handle.sender)
    }

    /// Remove the user's entry only if it still belongs to `id`
    pub async fn remove_if_current(&self, user_id: UserId, id: ConnectionId) -> bool {
        let mut state = self.state.lock().await;
        match state.connections.get(&user_id) {
            Some(handle) if handle.id == id => {
                state.connections.remove(&user_id);
                true
            }
            _ => false,
        }
    }

    pub async fn is_online(&self, user_id: UserId) -> bool {
        self.state.lock().await.connections.contains_key(&user_id)
    }

    pub async fn current_connection(&self, user_id: UserId) -> Option<ConnectionId> {
        self.state
            .lock()
            .await
            .connections
            .get(&user_id)
            .map(|handle| handle.id)
    }

    /// Connected user ids in ascending order
    pub async fn online_users(&self) -> Vec<UserId> {
        let state = self.state.lock().await;
        let mut users: Vec<UserId> = state.connections.keys().copied().collect();
        users.sort_unstable();
        users
    }

    pub async fn connection_count(&self) -> usize {
        self.state.lock().await.connections.len()
    }

    pub async fn send_to(&self, user_id: UserId, event: &ServerEvent) -> DeliveryOutcome {
        self.state.lock().await.deliver(user_id, event)
    }

    /// Push one event to each recipient that has a live socket
    pub async fn fan_out(&self, recipients: &[UserId], event: &ServerEvent) -> FanoutReport {
        let mut state = self.state.lock().await;
        let outcomes = recipients
            .iter()
            .map(|user_id| (*user_id, state.deliver(*user_id, event)))
            .collect();
        FanoutReport { outcomes }
    }

    /// Push one event to every connected user except `except`
    pub async fn broadcast_except(&self, except: UserId, event: &ServerEvent) -> FanoutReport {
        let mut state = self.state.lock().await;
        let mut recipients: Vec<UserId> = state
            .connections
            .keys()
            .copied()
            .filter(|user_id| *user_id != except)
            .collect();
        recipients.sort_unstable();
        let outcomes = recipients
            .into_iter()
            .map(|user_id| (user_id, state.deliver(user_id, event)))
            .collect();
        FanoutReport { outcomes }
    }

    /// Raise or lower a typing flag; returns whether the flag changed
    pub async fn set_typing(&self, chat_id: ChatId, user_id: UserId, is_typing: bool) -> bool {
        let mut state = self.state.lock().await;
        if is_typing {
            state.typing.entry(chat_id).or_default().insert(user_id)
        } else {
            remove_typing(&mut state.typing, chat_id, user_id)
        }
    }

    /// Lower the user's flag in one chat; returns whether it was raised
    pub async fn clear_typing_in(&self, chat_id: ChatId, user_id: UserId) -> bool {
        let mut state = self.state.lock().await;
        remove_typing(&mut state.typing, chat_id, user_id)
    }

    /// Lower every flag the user holds; returns the affected chats in
    /// ascending order
    pub async fn clear_typing(&self, user_id: UserId) -> Vec<ChatId> {
        let mut state = self.state.lock().await;
        let mut chats: Vec<ChatId> = state
            .typing
            .iter()
            .filter(|(_, users)| users.contains(&user_id))
            .map(|(chat_id, _)| *chat_id)
            .collect();
        chats.sort_unstable();
        for chat_id in &chats {
            remove_typing(&mut state.typing, *chat_id, user_id);
        }
        chats
    }

    /// Users currently typing in a chat, ascending
    pub async fn typing_users(&self, chat_id: ChatId) -> Vec<UserId> {
        let state = self.state.lock().await;
        let mut users: Vec<UserId> = state
            .typing
            .get(&chat_id)
            .map(|users| users.iter().copied().collect())
            .unwrap_or_default();
        users.sort_unstable();
        users
    }
}

fn remove_typing(
    typing: &mut HashMap<ChatId, HashSet<UserId>>,
    chat_id: ChatId,
    user_id: UserId,
) -> bool {
    let Some(users) = typing.get_mut(&chat_id) else {
        return false;
    };
    let removed = users.remove(&user_id);
    if users.is_empty() {
        typing.remove(&chat_id);
    }
    removed
}
