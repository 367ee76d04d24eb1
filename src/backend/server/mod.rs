//! Server Module
//!
//! This module contains the code that assembles and tears down the Axum
//! application.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Event log database loading
//! └── init.rs         - App creation and shutdown
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration**: validated `AppConfig`
//! 2. **Database**: SQLite pool and schema
//! 3. **Background Tasks**: broadcast hub loop and batch writer
//! 4. **Router Creation**: routes and middleware
//!
//! # Example
//!
//! ```rust,no_run
//! use livecount::backend::server::create_app;
//! use livecount::shared::AppConfig;
//!
//! # async fn example() -> Result<(), livecount::backend::BackendError> {
//! let app = create_app(AppConfig::default()).await?;
//! let report = app.shutdown().await;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Database loading
pub mod config;

/// Server initialization
pub mod init;

#[cfg(feature = "ssr")]
pub use init::{create_app, App, ShutdownHandle};
#[cfg(feature = "ssr")]
pub use state::AppState;
