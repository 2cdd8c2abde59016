//! Shared Error Types
//!
//! This module defines error types for the shared data model: wire events,
//! chats and messages. These errors are raised before anything touches the
//! store or the connection registry.
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON serialization failures on outbound events
//! - `ValidationError` - A field holds a value the model does not accept
//! - `InvalidEvent` - An inbound frame is not a known client event
//!
//! # Usage
//!
//! ```rust
//! use chatapp::shared::error::SharedError;
//!
//! let error = SharedError::validation("content", "Message content cannot be empty");
//! assert_eq!(error.code(), "invalid_event");
//! ```
use thiserror::Error;

/// Shared error types raised by the data model and the wire codec
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// JSON serialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Inbound frame that does not decode into a known event
    #[error("Invalid event: {message}")]
    InvalidEvent {
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new invalid-event error
    pub fn invalid_event(message: impl Into<String>) -> Self {
        Self::InvalidEvent {
            message: message.into(),
        }
    }

    /// Stable machine-readable code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            Self::SerializationError { .. } => "serialization_error",
            Self::ValidationError { .. } | Self::InvalidEvent { .. } => "invalid_event",
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
