/**
 * Backend Error Types
 *
 * This module defines the error type returned by server construction and
 * by the few handlers that can fail. It aggregates the errors of the
 * configuration, storage, hub and rendering layers and maps each of them to
 * an HTTP status code.
 *
 * # Error Categories
 *
 * ## Startup Errors
 *
 * Raised by `create_app` and the binary; they abort startup:
 * - Invalid configuration
 * - Database open or schema failure
 *
 * ## Request Errors
 *
 * Raised while serving a request:
 * - Broadcast hub not running (stream cannot register)
 * - Render failure on the index page
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::persistence::StoreError;
use crate::backend::realtime::HubError;
use crate::backend::render::RenderError;
use crate::shared::ConfigError;

/// Backend-specific error types
///
/// Each variant can be converted to an HTTP response.
///
/// # Usage
///
/// ```rust
/// use livecount::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::handler(StatusCode::BAD_REQUEST, "Invalid request");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error with an explicit status
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    /// Database could not be opened or prepared
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// Event log query failure
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    /// The broadcast hub is not running
    #[error("Hub error: {0}")]
    HubError(#[from] HubError),

    /// Markup could not be rendered
    #[error("Render error: {0}")]
    RenderError(#[from] RenderError),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `HubError` - 503 Service Unavailable
    /// - Everything else - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::HubError(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::ConfigError(_)
            | Self::DatabaseError(_)
            | Self::StoreError(_)
            | Self::RenderError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
