//! Test server fixture
//!
//! Spawns the full router on `127.0.0.1:0` over an in-memory store seeded
//! with the demo data set.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chatapp::backend::seed::{seed_demo_data, SeedReport};
use chatapp::backend::server::{create_app_with_store, AppState};
use chatapp::backend::store::MemoryStore;
use chatapp::shared::messaging::{ChatId, UserId};
use chatapp::shared::AppConfig;

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    pub seed: SeedReport,
}

impl TestServer {
    pub fn user(&self, username: &str) -> UserId {
        self.seed
            .user_id(username)
            .unwrap_or_else(|| panic!("no seeded user {}", username))
    }

    /// The seeded alice-bob private chat
    pub fn private_chat(&self) -> ChatId {
        self.seed.chats[0]
    }

    /// The seeded "Demo Team" group
    pub fn group_chat(&self) -> ChatId {
        self.seed.chats[1]
    }

    pub fn token(&self, username: &str) -> String {
        self.seed
            .tokens
            .iter()
            .find(|(name, _)| name == username)
            .map(|(_, token)| token.clone())
            .unwrap_or_else(|| panic!("no token for {}", username))
    }

    pub fn ws_url(&self, user_id: UserId, token: Option<&str>) -> String {
        match token {
            Some(token) => format!("ws://{}/ws/{}?token={}", self.addr, user_id, token),
            None => format!("ws://{}/ws/{}", self.addr, user_id),
        }
    }

    /// Wait for the registry to hold (or drop) a socket for `user_id`
    pub async fn wait_online(&self, user_id: UserId, online: bool) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while self.state.hub.is_online(user_id).await != online {
            if tokio::time::Instant::now() > deadline {
                panic!("user {} never became online={}", user_id, online);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

pub async fn spawn_server(require_auth: bool) -> TestServer {
    let config = AppConfig::builder()
        .host("127.0.0.1")
        .port(0)
        .jwt_secret(TEST_SECRET)
        .require_auth(require_auth)
        .allowed_origins(Vec::new())
        .build()
        .expect("test config");

    let store = Arc::new(MemoryStore::new());
    let seed = seed_demo_data(store.as_ref(), TEST_SECRET)
        .await
        .expect("seed demo data");

    let (app, state) = create_app_with_store(store, config);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    TestServer { addr, state, seed }
}
