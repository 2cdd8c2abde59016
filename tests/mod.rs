//! Test suite for the chat backend
//!
//! This module organizes all tests

pub mod common;
pub mod integration;
pub mod property;
