//! WebSocket client helpers built on tokio-tungstenite

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use chatapp::shared::ServerEvent;

use super::server::TestServer;

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Connect as `username` with that user's seeded token
pub async fn connect_as(server: &TestServer, username: &str) -> Client {
    let user_id = server.user(username);
    let token = server.token(username);
    let (client, _) = connect_async(server.ws_url(user_id, Some(&token)))
        .await
        .expect("websocket connect");
    server.wait_online(user_id, true).await;
    client
}

pub async fn send_json(client: &mut Client, value: serde_json::Value) {
    client
        .send(Message::text(value.to_string()))
        .await
        .expect("send frame");
}

/// Next decoded server event, skipping control frames
pub async fn next_event(client: &mut Client) -> ServerEvent {
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("websocket error");
        match frame {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("decode server event")
            }
            Message::Close(frame) => panic!("unexpected close: {:?}", frame),
            _ => continue,
        }
    }
}

/// Next event whose wire tag is `kind`, skipping everything else
pub async fn next_event_of(client: &mut Client, kind: &str) -> ServerEvent {
    loop {
        let event = next_event(client).await;
        if event.kind() == kind {
            return event;
        }
    }
}

/// Wait for a close frame and return its code
pub async fn next_close_code(client: &mut Client) -> Option<u16> {
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, client.next())
            .await
            .expect("timed out waiting for close");
        match frame {
            Some(Ok(Message::Close(frame))) => return frame.map(|f| u16::from(f.code)),
            Some(Ok(_)) => continue,
            Some(Err(_)) | None => return None,
        }
    }
}

/// Assert nothing but control frames arrive for a short while
pub async fn assert_quiet(client: &mut Client) {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(200);
    loop {
        match tokio::time::timeout_at(deadline, client.next()).await {
            Err(_) => return,
            Ok(Some(Ok(Message::Text(text)))) => panic!("unexpected frame: {}", text.as_str()),
            Ok(Some(Ok(_))) => continue,
            Ok(other) => panic!("socket ended: {:?}", other),
        }
    }
}
