//! Integration tests against a live server

pub mod api;
pub mod realtime;
