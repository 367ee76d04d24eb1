//! Shared Error Types
//!
//! Error types that do not depend on the server stack.
//!
//! # Usage
//!
//! ```rust
//! use livecount::shared::error::SharedError;
//!
//! let error = SharedError::validation("action", "unknown counter action 'double'");
//! ```
use thiserror::Error;

/// Errors that can occur outside the server stack
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// Data validation error (unknown action names)
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}
