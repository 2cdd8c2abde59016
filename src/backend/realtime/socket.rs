/**
 * WebSocket Connection Task
 *
 * Serves one accepted socket for its whole life:
 *
 * 1. Split the socket; a writer task owns the sink and drains an unbounded
 *    channel whose sender is registered with the hub.
 * 2. The writer also pings on a fixed interval.
 * 3. The reader loop feeds text frames to the hub and queues any reply on
 *    the same channel. Binary frames are answered with an `error` event.
 * 4. If nothing at all arrives within the ping timeout the socket is
 *    closed with 1001.
 * 5. The reader stops as soon as the writer does (replacement, a failed
 *    write) and drops any frame that arrives after this socket stopped
 *    being the user's current one.
 * 6. On exit the hub tears the user down, unless a newer socket has
 *    already replaced this one.
 */
use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, timeout, MissedTickBehavior};

use super::hub::ChatHub;
use super::registry::{ConnectionReceiver, Outbound};
use crate::shared::messaging::UserId;
use crate::shared::{AppConfig, ServerEvent};

/// Close code sent when the peer stops answering pings
const CLOSE_GOING_AWAY: u16 = 1001;

/// How long the writer gets to flush queued frames after the reader exits
const WRITER_GRACE: Duration = Duration::from_secs(5);

/// Ping cadence and liveness deadline for one socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heartbeat {
    pub interval: Duration,
    pub timeout: Duration,
}

impl From<&AppConfig> for Heartbeat {
    fn from(config: &AppConfig) -> Self {
        Self {
            interval: config.ws_ping_interval,
            timeout: config.ws_ping_timeout,
        }
    }
}

/// Run the socket for `user_id` until either side closes it
pub async fn serve_socket(socket: WebSocket, hub: Arc<ChatHub>, user_id: UserId, heartbeat: Heartbeat) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<Outbound>();

    let connection_id = hub.connect(user_id, tx.clone()).await;
    let mut writer = tokio::spawn(writer_task(ws_sender, rx, heartbeat.interval));
    let mut writer_finished = false;

    loop {
        let next = tokio::select! {
            _ = &mut writer => {
                writer_finished = true;
                tracing::debug!(user_id, connection = %connection_id, "[Realtime] Writer stopped");
                break;
            }
            next = timeout(heartbeat.timeout, ws_receiver.next()) => next,
        };

        let frame = match next {
            Ok(Some(Ok(frame))) => frame,
            Ok(Some(Err(e))) => {
                tracing::warn!(user_id, error = %e, "[Realtime] WebSocket receive error");
                break;
            }
            Ok(None) => {
                tracing::debug!(user_id, "[Realtime] WebSocket stream ended");
                break;
            }
            Err(_) => {
                tracing::warn!(user_id, "[Realtime] Ping timeout, closing connection");
                let _ = tx.send(Outbound::Close {
                    code: CLOSE_GOING_AWAY,
                    reason: "Ping timeout".to_string(),
                });
                break;
            }
        };

        if !hub.is_current(user_id, connection_id).await {
            tracing::info!(
                user_id,
                connection = %connection_id,
                "[Realtime] Frame on replaced connection, closing reader"
            );
            break;
        }

        match frame {
            Message::Text(text) => {
                if let Some(reply) = hub.handle_text(user_id, text.as_str()).await {
                    let _ = tx.send(Outbound::Event(reply));
                }
            }
            Message::Binary(_) => {
                let _ = tx.send(Outbound::Event(ServerEvent::error(
                    "invalid_event",
                    "Binary frames are not supported",
                )));
            }
            // Pings are answered by the protocol layer; any frame counts as liveness
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(frame) => {
                tracing::debug!(user_id, reason = ?frame, "[Realtime] Client initiated close");
                break;
            }
        }
    }

    hub.disconnect_connection(user_id, connection_id).await;

    drop(tx);
    if !writer_finished && timeout(WRITER_GRACE, &mut writer).await.is_err() {
        writer.abort();
    }
}

/// Forward queued frames to the socket and ping on `ping_interval`
async fn writer_task(
    mut ws_sender: SplitSink<WebSocket, Message>,
    mut rx: ConnectionReceiver,
    ping_interval: Duration,
) {
    let mut ticker = interval(ping_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Skip the first immediate tick
    ticker.tick().await;

    loop {
        tokio::select! {
            frame = rx.recv() => match frame {
                Some(Outbound::Event(event)) => {
                    let text = match event.to_json() {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::error!("[Realtime] Failed to encode {} event: {}", event.kind(), e);
                            continue;
                        }
                    };
                    if ws_sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Some(Outbound::Close { code, reason }) => {
                    let _ = ws_sender
                        .send(Message::Close(Some(CloseFrame {
                            code,
                            reason: reason.into(),
                        })))
                        .await;
                    break;
                }
                None => {
                    let _ = ws_sender.close().await;
                    break;
                }
            },
            _ = ticker.tick() => {
                if ws_sender.send(Message::Ping(Vec::<u8>::new().into())).await.is_err() {
                    break;
                }
            }
        }
    }
}
