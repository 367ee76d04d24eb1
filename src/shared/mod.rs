//! Shared Module
//!
//! This module contains types that do not depend on the server stack:
//! counter actions, mutation events, configuration and error types. They are
//! serializable so they can travel over HTTP or into logs unchanged.

/// Counter action kinds and history records
pub mod action;

/// Mutation events queued for the persistent log
pub mod event;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use action::{ActionRecord, CounterAction};
pub use event::MutationEvent;
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
