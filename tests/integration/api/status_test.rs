//! Status route against a live registry

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use chatapp::backend::routes::create_router;

use crate::common::*;

async fn get_json(server: &TestServer, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = create_router(server.state.clone())
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_status_follows_socket_lifecycle() {
    let server = spawn_server(true).await;
    let diana = server.user("diana");
    let uri = format!("/api/users/{}/status", diana);

    let (status, body) = get_json(&server, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["online"], false);

    let mut client = connect_as(&server, "diana").await;
    let (_, body) = get_json(&server, &uri).await;
    assert_eq!(body["online"], true);
    assert_eq!(body["user_id"], diana);

    client.close(None).await.unwrap();
    server.wait_online(diana, false).await;
    let (_, body) = get_json(&server, &uri).await;
    assert_eq!(body["online"], false);
    assert!(body["last_seen"].is_string());
}

#[tokio::test]
async fn test_health_counts_connections() {
    let server = spawn_server(true).await;
    let _alice = connect_as(&server, "alice").await;
    let _bob = connect_as(&server, "bob").await;

    let (status, body) = get_json(&server, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connections"], 2);
}
