//! Routes Module
//!
//! Route configuration for the backend server.
//!
//! # Dependencies
//!
//! - `backend::server::state` - Application state
//! - `backend::counter::handlers` - Page, mutation and health handlers
//! - `backend::realtime::subscription` - Stream handler
//! - `backend::middleware` - Client identification

/// Main router creation
pub mod router;

#[cfg(feature = "ssr")]
pub use router::create_router;
