//! Upgrade authentication

use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Error as WsError;

use chatapp::backend::auth::create_token;

use crate::common::*;

fn expect_status<T>(result: Result<T, WsError>, status: u16) {
    match result {
        Err(WsError::Http(response)) => assert_eq!(response.status().as_u16(), status),
        Err(other) => panic!("expected HTTP {}, got {:?}", status, other),
        Ok(_) => panic!("expected HTTP {}, but the upgrade succeeded", status),
    }
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let server = spawn_server(true).await;
    let alice = server.user("alice");

    expect_status(connect_async(server.ws_url(alice, None)).await, 401);
    assert!(!server.state.hub.is_online(alice).await);
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let server = spawn_server(true).await;
    let alice = server.user("alice");

    expect_status(connect_async(server.ws_url(alice, Some("not.a.jwt"))).await, 401);
}

#[tokio::test]
async fn test_token_for_another_user_is_rejected() {
    let server = spawn_server(true).await;
    let alice = server.user("alice");
    let bob_token = server.token("bob");

    expect_status(connect_async(server.ws_url(alice, Some(&bob_token))).await, 401);
    assert_eq!(server.state.hub.registry().connection_count().await, 0);
}

#[tokio::test]
async fn test_unknown_user_is_404() {
    let server = spawn_server(true).await;
    let token = create_token(TEST_SECRET, 999, None).unwrap();

    expect_status(connect_async(server.ws_url(999, Some(&token))).await, 404);
}

#[tokio::test]
async fn test_auth_disabled_accepts_any_known_user() {
    let server = spawn_server(false).await;
    let eve = server.user("eve");

    let (_client, _) = connect_async(server.ws_url(eve, None)).await.unwrap();
    server.wait_online(eve, true).await;
}
