/**
 * Backend Error Types
 *
 * Errors returned by HTTP handlers. Each variant maps to a status code and
 * a stable machine-readable code for the JSON body.
 *
 * # Error Categories
 *
 * ## Handler Errors
 *
 * Raised while processing a request:
 * - Missing or invalid bearer token on the WebSocket upgrade
 * - Unknown user in the path
 *
 * ## Store Errors
 *
 * Raised by the persistence layer. Conflicts become 409, lookups that miss
 * become 404 and an unreachable database becomes 503.
 */

use crate::backend::store::StoreError;
use crate::shared::SharedError;
use axum::http::StatusCode;
use thiserror::Error;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use chatapp::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::unauthorized("Missing token");
/// assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g., missing token, unknown path parameter)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// State management error
    #[error("State error: {message}")]
    StateError {
        /// Human-readable error message
        message: String,
    },

    /// Shared error (validation or serialization of shared types)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Persistence error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::UNAUTHORIZED, message)
    }

    /// Create a new state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::StateError {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `StateError` - 500 Internal Server Error
    /// - `SharedError` - 400, or 500 for serialization failures
    /// - `Store` - 404 / 403 / 409 / 400 / 503 depending on the failure
    /// - `SerializationError` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::StateError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                SharedError::ValidationError { .. } | SharedError::InvalidEvent { .. } => {
                    StatusCode::BAD_REQUEST
                }
            },
            Self::Store(err) => match err {
                err if err.is_not_found() => StatusCode::NOT_FOUND,
                StoreError::NotParticipant { .. } => StatusCode::FORBIDDEN,
                StoreError::Conflict(_) => StatusCode::CONFLICT,
                StoreError::Database(_) | StoreError::Unavailable(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                _ => StatusCode::BAD_REQUEST,
            },
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code included in the response body
    pub fn code(&self) -> &'static str {
        match self {
            Self::HandlerError { status, .. } => match *status {
                StatusCode::UNAUTHORIZED => "unauthorized",
                StatusCode::NOT_FOUND => "not_found",
                StatusCode::BAD_REQUEST => "bad_request",
                _ => "request_failed",
            },
            Self::StateError { .. } => "internal_error",
            Self::SharedError(err) => err.code(),
            Self::Store(err) => err.code(),
            Self::SerializationError(_) => "serialization_error",
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::StateError { message, .. } => message.clone(),
            Self::SharedError(err) => err.to_string(),
            // Database details stay in the logs
            Self::Store(StoreError::Database(_)) => "Database unavailable".to_string(),
            Self::Store(err) => err.to_string(),
            Self::SerializationError(err) => err.to_string(),
        }
    }
}
