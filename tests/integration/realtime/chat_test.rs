//! Messaging, typing and read receipts over real sockets

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use serde_json::json;

use chatapp::shared::ServerEvent;

use crate::common::*;

#[tokio::test]
async fn test_hi_bye_exchange() {
    let server = spawn_server(true).await;
    let chat = server.private_chat();
    let (alice_id, bob_id) = (server.user("alice"), server.user("bob"));

    let mut alice = connect_as(&server, "alice").await;
    let mut bob = connect_as(&server, "bob").await;

    send_json(&mut alice, json!({"type": "send_message", "chat_id": chat, "content": "hi"})).await;

    let on_bob = next_event_of(&mut bob, "message").await;
    let on_alice = next_event_of(&mut alice, "message").await;
    assert_eq!(on_bob, on_alice);
    assert_matches!(&on_bob, ServerEvent::Message(m) if m.content == "hi" && m.sender_id == alice_id);

    send_json(&mut bob, json!({"type": "send_message", "chat_id": chat, "content": "bye"})).await;

    let reply = next_event_of(&mut alice, "message").await;
    assert_matches!(&reply, ServerEvent::Message(m) if m.content == "bye" && m.sender_id == bob_id);
    assert_matches!(next_event_of(&mut bob, "message").await, ServerEvent::Message(m) if m.content == "bye");

    let history = server.state.store().list_messages(chat, 10, 0).await.unwrap();
    let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(&contents[..2], &["bye", "hi"]);
}

#[tokio::test]
async fn test_bye_after_peer_leaves() {
    let server = spawn_server(true).await;
    let chat = server.private_chat();
    let bob_id = server.user("bob");

    let mut alice = connect_as(&server, "alice").await;
    let mut bob = connect_as(&server, "bob").await;

    send_json(&mut alice, json!({"type": "send_message", "chat_id": chat, "content": "hi"})).await;
    assert_matches!(next_event_of(&mut bob, "message").await, ServerEvent::Message(m) if m.content == "hi");
    assert_matches!(next_event_of(&mut alice, "message").await, ServerEvent::Message(m) if m.content == "hi");

    bob.close(None).await.unwrap();
    server.wait_online(bob_id, false).await;

    send_json(&mut alice, json!({"type": "send_message", "chat_id": chat, "content": "bye"})).await;
    assert_matches!(next_event_of(&mut alice, "message").await, ServerEvent::Message(m) if m.content == "bye");

    let mut bob = connect_as(&server, "bob").await;
    assert_quiet(&mut bob).await;

    let history = server.state.store().list_messages(chat, 10, 0).await.unwrap();
    let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(&contents[..2], &["bye", "hi"]);
}

#[tokio::test]
async fn test_group_message_reaches_connected_members_only() {
    let server = spawn_server(true).await;
    let group = server.group_chat();

    let mut charlie = connect_as(&server, "charlie").await;
    let mut eve = connect_as(&server, "eve").await;
    let mut alice = connect_as(&server, "alice").await;

    send_json(&mut alice, json!({"type": "send_message", "chat_id": group, "content": "standup?"})).await;

    assert_matches!(next_event_of(&mut charlie, "message").await, ServerEvent::Message(m) if m.chat_id == group);
    assert_matches!(next_event_of(&mut alice, "message").await, ServerEvent::Message(_));

    // eve is not in the group; she only saw alice come online
    assert_matches!(next_event(&mut eve).await, ServerEvent::UserStatus { .. });
    assert_quiet(&mut eve).await;
}

#[tokio::test]
async fn test_typing_goes_to_others_only() {
    let server = spawn_server(true).await;
    let chat = server.private_chat();
    let alice_id = server.user("alice");

    let mut bob = connect_as(&server, "bob").await;
    let mut alice = connect_as(&server, "alice").await;

    send_json(&mut alice, json!({"type": "typing", "chat_id": chat, "is_typing": true})).await;

    assert_matches!(
        next_event_of(&mut bob, "typing").await,
        ServerEvent::Typing { chat_id, user_id, is_typing: true, .. } if chat_id == chat && user_id == alice_id
    );
    assert_quiet(&mut alice).await;
    assert_eq!(server.state.hub.registry().typing_users(chat).await, vec![alice_id]);
}

#[tokio::test]
async fn test_read_receipt_is_relayed() {
    let server = spawn_server(true).await;
    let chat = server.private_chat();
    let bob_id = server.user("bob");
    let message_id = server.state.store().list_messages(chat, 1, 0).await.unwrap()[0].id;

    let mut alice = connect_as(&server, "alice").await;
    let mut bob = connect_as(&server, "bob").await;

    send_json(
        &mut bob,
        json!({"type": "message_read", "chat_id": chat, "message_id": message_id}),
    )
    .await;

    assert_matches!(
        next_event_of(&mut alice, "message_read").await,
        ServerEvent::MessageRead { reader_id, message_id: read, .. } if reader_id == bob_id && read == message_id
    );
}

#[tokio::test]
async fn test_join_and_leave_are_acknowledged() {
    let server = spawn_server(true).await;
    let chat = server.group_chat();
    let mut bob = connect_as(&server, "bob").await;

    send_json(&mut bob, json!({"type": "join_chat", "chat_id": chat})).await;
    assert_eq!(next_event(&mut bob).await, ServerEvent::JoinSuccess { chat_id: chat });

    send_json(&mut bob, json!({"type": "leave_chat", "chat_id": chat})).await;
    assert_eq!(next_event(&mut bob).await, ServerEvent::LeaveSuccess { chat_id: chat });
}

#[tokio::test]
async fn test_bad_frames_get_error_and_keep_socket() {
    let server = spawn_server(true).await;
    let chat = server.private_chat();
    let mut alice = connect_as(&server, "alice").await;

    send_json(&mut alice, json!({"type": "teleport"})).await;
    assert_matches!(next_event(&mut alice).await, ServerEvent::Error { code, .. } if code == "invalid_event");

    send_json(&mut alice, json!({"type": "send_message", "chat_id": chat, "content": "   "})).await;
    assert_matches!(next_event(&mut alice).await, ServerEvent::Error { code, .. } if code == "invalid_event");

    // still usable
    send_json(&mut alice, json!({"type": "join_chat", "chat_id": chat})).await;
    assert_eq!(next_event(&mut alice).await, ServerEvent::JoinSuccess { chat_id: chat });
}

#[tokio::test]
async fn test_outsider_cannot_post() {
    let server = spawn_server(true).await;
    let chat = server.private_chat();
    let before = server.state.store().list_messages(chat, 50, 0).await.unwrap().len();

    let mut eve = connect_as(&server, "eve").await;
    send_json(&mut eve, json!({"type": "send_message", "chat_id": chat, "content": "let me in"})).await;

    assert_matches!(next_event(&mut eve).await, ServerEvent::Error { code, .. } if code == "not_participant");
    let after = server.state.store().list_messages(chat, 50, 0).await.unwrap().len();
    assert_eq!(before, after);
}
