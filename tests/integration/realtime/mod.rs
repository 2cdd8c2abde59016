//! WebSocket integration tests

pub mod auth_test;
pub mod chat_test;
pub mod presence_test;
