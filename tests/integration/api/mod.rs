//! HTTP API integration tests

pub mod status_test;
