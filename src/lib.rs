//! livecount - Main Library
//!
//! livecount keeps one shared counter consistent across every connected
//! viewer. Mutations are applied in memory, fanned out to all open
//! Server-Sent Events streams as rendered HTML patches, and logged to a
//! SQLite event table by a background batching writer.
//!
//! # Module Structure
//!
//! - **`shared`** - Platform-agnostic types
//!   - Counter actions and mutation events
//!   - Application configuration
//!   - Error types
//!
//! - **`backend`** - Server-side code (only compiled with the `ssr` feature)
//!   - Axum HTTP server and routes
//!   - Broadcast hub and subscriber sessions
//!   - Event queue, batch writer and SQLite event log
//!   - Counter state and HTML rendering
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Enables the backend modules and the
//!   `livecount-server` binary.
//!
//! # Usage
//!
//! ```rust,no_run
//! use livecount::backend::server::init::create_app;
//! use livecount::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(AppConfig::default()).await?;
//! let router = app.router.clone();
//! // Serve `router` with axum, then call `app.shutdown().await`
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! - The broadcast hub registry is owned by a single task and only reached
//!   through its mailbox.
//! - The batch accumulator is owned by the writer task.
//! - Counter state sits behind one `tokio::sync::RwLock`, so snapshots are
//!   never torn.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
