/**
 * Chat Hub
 *
 * Ties the connection registry to the store. The hub owns the lifecycle of
 * a user's socket (connect, replace, disconnect), dispatches inbound client
 * events and fans the results out to connected participants.
 *
 * # Delivery Rules
 *
 * - `send_message` is persisted first; nothing is broadcast if that fails.
 *   The stored message then goes to every connected participant, sender
 *   included. Offline participants get nothing.
 * - `typing` and `message_read` go to the other participants only and are
 *   never persisted.
 * - `join_chat` and `leave_chat` are answered on the originating socket.
 * - A recipient whose socket is gone is torn down as if it had
 *   disconnected, and delivery to everyone else continues.
 *
 * # Presence
 *
 * Registering a socket and tearing a user down both run under one presence
 * lock, covering the registry check, the store's online flag and the
 * `user_status` broadcast. A teardown that overlaps a reconnect therefore
 * finishes before the reconnect starts, or sees the new socket and stops.
 */
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use super::registry::{
    ConnectionId, ConnectionRegistry, ConnectionSender, FanoutReport, Outbound, CLOSE_NORMAL,
    CLOSE_REPLACED,
};
use crate::backend::store::{ChatStore, StoreError};
use crate::shared::messaging::{ChatId, NewMessage, PresenceStatus, UserId};
use crate::shared::{ClientEvent, ServerEvent, SharedError};

/// Errors from handling one inbound event
///
/// None of these close the socket; each becomes an `error` event for the
/// originating connection.
#[derive(Debug, Error)]
pub enum HubError {
    #[error(transparent)]
    InvalidEvent(#[from] SharedError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl HubError {
    pub fn code(&self) -> &'static str {
        match self {
            HubError::InvalidEvent(err) => err.code(),
            HubError::Store(err) => err.code(),
        }
    }

    /// The `error` frame reported to the client
    pub fn to_event(&self) -> ServerEvent {
        ServerEvent::error(self.code(), self.to_string())
    }
}

/// What handling an inbound event produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundOutcome {
    /// Pushed to other connections through the registry
    Broadcast(FanoutReport),
    /// Reply for the originating connection only
    Reply(ServerEvent),
}

/// Connection registry plus the store it reports into
pub struct ChatHub {
    registry: ConnectionRegistry,
    store: Arc<dyn ChatStore>,
    presence: Mutex<()>,
}

impl ChatHub {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            store,
            presence: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn ChatStore> {
        &self.store
    }

    pub async fn is_online(&self, user_id: UserId) -> bool {
        self.registry.is_online(user_id).await
    }

    /// Whether `connection_id` is still the socket registered for `user_id`
    pub async fn is_current(&self, user_id: UserId, connection_id: ConnectionId) -> bool {
        self.registry.current_connection(user_id).await == Some(connection_id)
    }

    /// Register a socket for `user_id` and mark the user online
    ///
    /// A socket already registered for the user is sent a close frame with
    /// code 4000 and forgotten; the user stays online and no presence event
    /// is sent. Otherwise every other connected user receives
    /// `user_status: online`.
    pub async fn connect(&self, user_id: UserId, sender: ConnectionSender) -> ConnectionId {
        let connection_id = ConnectionId::new();

        let failed = {
            let _presence = self.presence.lock().await;
            let replaced = self.registry.insert(user_id, connection_id, sender).await;

            if let Err(e) = self.store.set_user_online(user_id, true).await {
                tracing::warn!("[Realtime] Failed to mark user {} online: {}", user_id, e);
            }

            match replaced {
                Some(previous) => {
                    tracing::info!(
                        user_id,
                        connection = %connection_id,
                        "[Realtime] Connection replaced"
                    );
                    let _ = previous.send(Outbound::Close {
                        code: CLOSE_REPLACED,
                        reason: "Replaced by a newer connection".to_string(),
                    });
                    Vec::new()
                }
                None => {
                    tracing::info!(user_id, connection = %connection_id, "[Realtime] User connected");
                    let event = ServerEvent::user_status(user_id, PresenceStatus::Online);
                    self.registry.broadcast_except(user_id, &event).await.failed()
                }
            }
        };

        self.drop_failed(failed).await;
        connection_id
    }

    /// Remove the user's socket, whichever it is, and mark the user offline
    ///
    /// Returns false when the user had no socket. The removed socket is sent
    /// a normal close frame.
    pub async fn disconnect(&self, user_id: UserId) -> bool {
        let Some(sender) = self.registry.remove(user_id).await else {
            return false;
        };
        let _ = sender.send(Outbound::Close {
            code: CLOSE_NORMAL,
            reason: "Disconnected".to_string(),
        });
        self.drop_failed(vec![user_id]).await;
        true
    }

    /// Tear down only if `connection_id` is still the user's current socket
    ///
    /// Called by a socket task when it exits. A socket that was replaced
    /// leaves its successor untouched.
    pub async fn disconnect_connection(&self, user_id: UserId, connection_id: ConnectionId) -> bool {
        if !self.registry.remove_if_current(user_id, connection_id).await {
            tracing::debug!(
                user_id,
                connection = %connection_id,
                "[Realtime] Stale connection closed"
            );
            return false;
        }
        self.drop_failed(vec![user_id]).await;
        true
    }

    /// Dispatch one inbound event from `user_id`
    pub async fn handle_inbound(
        &self,
        user_id: UserId,
        event: ClientEvent,
    ) -> Result<InboundOutcome, HubError> {
        tracing::debug!(user_id, kind = event.kind(), "[Realtime] Inbound event");

        match event {
            ClientEvent::SendMessage {
                chat_id,
                content,
                reply_to,
            } => {
                let message = self
                    .store
                    .create_message(NewMessage::text(chat_id, user_id, content, reply_to))
                    .await?;
                let participants = self.store.get_chat_participants(chat_id).await?;
                let report = self
                    .fan_out(&participants, &ServerEvent::Message(message))
                    .await;
                tracing::debug!(
                    chat_id,
                    delivered = report.delivered().len(),
                    offline = report.offline().len(),
                    "[Realtime] Message fanned out"
                );
                Ok(InboundOutcome::Broadcast(report))
            }
            ClientEvent::Typing { chat_id, is_typing } => {
                let others = self.other_participants(chat_id, user_id).await?;
                self.registry.set_typing(chat_id, user_id, is_typing).await;
                let event = ServerEvent::typing(chat_id, user_id, is_typing);
                Ok(InboundOutcome::Broadcast(self.fan_out(&others, &event).await))
            }
            ClientEvent::JoinChat { chat_id } => {
                Ok(InboundOutcome::Reply(ServerEvent::JoinSuccess { chat_id }))
            }
            ClientEvent::LeaveChat { chat_id } => {
                if self.registry.clear_typing_in(chat_id, user_id).await {
                    let failed = self.notify_typing_stopped(chat_id, user_id).await;
                    self.drop_failed(failed).await;
                }
                Ok(InboundOutcome::Reply(ServerEvent::LeaveSuccess { chat_id }))
            }
            ClientEvent::MessageRead {
                chat_id,
                message_id,
            } => {
                let others = self.other_participants(chat_id, user_id).await?;
                let event = ServerEvent::message_read(chat_id, message_id, user_id);
                Ok(InboundOutcome::Broadcast(self.fan_out(&others, &event).await))
            }
        }
    }

    /// Decode and dispatch a text frame
    ///
    /// Returns the frame to send back on the originating socket: an
    /// acknowledgement or an `error`. Broadcasts produce no reply.
    pub async fn handle_text(&self, user_id: UserId, text: &str) -> Option<ServerEvent> {
        let result = match ClientEvent::parse(text) {
            Ok(event) => self.handle_inbound(user_id, event).await,
            Err(e) => Err(HubError::from(e)),
        };

        match result {
            Ok(InboundOutcome::Reply(event)) => Some(event),
            Ok(InboundOutcome::Broadcast(_)) => None,
            Err(e) => {
                tracing::warn!("[Realtime] Rejected event from user {}: {}", user_id, e);
                Some(e.to_event())
            }
        }
    }

    async fn other_participants(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> Result<Vec<UserId>, HubError> {
        let participants = self.store.get_chat_participants(chat_id).await?;
        if !participants.contains(&user_id) {
            return Err(StoreError::NotParticipant { chat_id, user_id }.into());
        }
        Ok(participants
            .into_iter()
            .filter(|id| *id != user_id)
            .collect())
    }

    async fn fan_out(&self, recipients: &[UserId], event: &ServerEvent) -> FanoutReport {
        let report = self.registry.fan_out(recipients, event).await;
        self.drop_failed(report.failed()).await;
        report
    }

    async fn notify_typing_stopped(&self, chat_id: ChatId, user_id: UserId) -> Vec<UserId> {
        let participants = match self.store.get_chat_participants(chat_id).await {
            Ok(participants) => participants,
            Err(e) => {
                tracing::warn!(
                    "[Realtime] Could not load participants of chat {}: {}",
                    chat_id,
                    e
                );
                return Vec::new();
            }
        };
        let others: Vec<UserId> = participants
            .into_iter()
            .filter(|id| *id != user_id)
            .collect();
        let event = ServerEvent::typing(chat_id, user_id, false);
        self.registry.fan_out(&others, &event).await.failed()
    }

    /// Finish tearing down users whose registry entries are already gone
    ///
    /// Marks each user offline, lowers their typing flags and tells the
    /// remaining users. Any socket found dead while doing so is queued and
    /// torn down in turn. A user who reconnected in the meantime is skipped.
    async fn drop_failed(&self, users: Vec<UserId>) {
        let mut pending = users;
        let mut done = HashSet::new();
        while let Some(user_id) = pending.pop() {
            if !done.insert(user_id) {
                continue;
            }
            let _presence = self.presence.lock().await;
            if self.registry.is_online(user_id).await {
                continue;
            }
            tracing::info!(user_id, "[Realtime] User disconnected");

            if let Err(e) = self.store.set_user_online(user_id, false).await {
                tracing::warn!("[Realtime] Failed to mark user {} offline: {}", user_id, e);
            }

            for chat_id in self.registry.clear_typing(user_id).await {
                pending.extend(self.notify_typing_stopped(chat_id, user_id).await);
            }

            let event = ServerEvent::user_status(user_id, PresenceStatus::Offline);
            let report = self.registry.broadcast_except(user_id, &event).await;
            pending.extend(report.failed());
        }
    }
}
