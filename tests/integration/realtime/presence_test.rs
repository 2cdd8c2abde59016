//! Presence and connection replacement

use assert_matches::assert_matches;
use futures_util::SinkExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use chatapp::shared::messaging::PresenceStatus;
use chatapp::shared::ServerEvent;

use crate::common::*;

#[tokio::test]
async fn test_connect_and_disconnect_broadcast_presence() {
    let server = spawn_server(true).await;
    let bob_id = server.user("bob");

    let mut alice = connect_as(&server, "alice").await;
    let mut bob = connect_as(&server, "bob").await;

    assert_matches!(
        next_event_of(&mut alice, "user_status").await,
        ServerEvent::UserStatus { user_id, status: PresenceStatus::Online, .. } if user_id == bob_id
    );

    bob.close(None).await.unwrap();
    server.wait_online(bob_id, false).await;

    assert_matches!(
        next_event_of(&mut alice, "user_status").await,
        ServerEvent::UserStatus { user_id, status: PresenceStatus::Offline, .. } if user_id == bob_id
    );
    let stored = server.state.store().get_user(bob_id).await.unwrap();
    assert!(!stored.is_online);
    assert!(stored.last_seen.is_some());
}

#[tokio::test]
async fn test_second_socket_replaces_first() {
    let server = spawn_server(true).await;
    let alice_id = server.user("alice");
    let mut bob = connect_as(&server, "bob").await;

    let mut first = connect_as(&server, "alice").await;
    let first_id = server.state.hub.registry().current_connection(alice_id).await;

    let token = server.token("alice");
    let (mut second, _) = connect_async(server.ws_url(alice_id, Some(&token))).await.unwrap();

    assert_eq!(next_close_code(&mut first).await, Some(4000));

    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    while server.state.hub.registry().current_connection(alice_id).await == first_id {
        assert!(tokio::time::Instant::now() < deadline, "replacement never registered");
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(server.state.hub.is_online(alice_id).await);
    assert_eq!(server.state.hub.registry().connection_count().await, 2);

    // bob saw alice come online once; the replacement is silent
    assert_matches!(next_event_of(&mut bob, "user_status").await, ServerEvent::UserStatus { .. });
    assert_quiet(&mut bob).await;

    send_json(&mut second, serde_json::json!({"type": "join_chat", "chat_id": server.private_chat()})).await;
    assert_matches!(next_event(&mut second).await, ServerEvent::JoinSuccess { .. });
}

#[tokio::test]
async fn test_replaced_socket_cannot_send() {
    let server = spawn_server(true).await;
    let alice_id = server.user("alice");
    let chat = server.private_chat();
    let before = server.state.store().list_messages(chat, 50, 0).await.unwrap().len();

    let mut bob = connect_as(&server, "bob").await;
    let mut first = connect_as(&server, "alice").await;
    let first_id = server.state.hub.registry().current_connection(alice_id).await;

    let token = server.token("alice");
    let (mut second, _) = connect_async(server.ws_url(alice_id, Some(&token))).await.unwrap();
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    while server.state.hub.registry().current_connection(alice_id).await == first_id {
        assert!(tokio::time::Instant::now() < deadline, "replacement never registered");
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_matches!(next_event_of(&mut bob, "user_status").await, ServerEvent::UserStatus { .. });

    // Sent without reading the 4000 close first; the server may already
    // have dropped the connection, so the write itself may fail
    let frame = serde_json::json!({"type": "send_message", "chat_id": chat, "content": "from old socket"});
    let _ = first.send(WsMessage::text(frame.to_string())).await;

    assert_quiet(&mut bob).await;
    assert_quiet(&mut second).await;
    let after = server.state.store().list_messages(chat, 50, 0).await.unwrap().len();
    assert_eq!(before, after);
    assert!(server.state.hub.is_online(alice_id).await);
}
