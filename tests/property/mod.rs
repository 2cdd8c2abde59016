//! Property-based tests

pub mod event_proptest;
pub mod message_proptest;
