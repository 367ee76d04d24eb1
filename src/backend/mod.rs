//! Backend Module
//!
//! This module contains all server-side code for livecount. It provides an
//! Axum HTTP server that keeps one counter in memory, pushes every change to
//! all open Server-Sent Events streams, and logs mutations to SQLite in the
//! background.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - App creation, state, database loading, shutdown
//! - **`routes`** - Router assembly
//! - **`counter`** - Counter state and page/mutation/health handlers
//! - **`realtime`** - Broadcast hub, subscriber sessions, `/stream`
//! - **`persistence`** - Event queue, batch writer, SQLite event log
//! - **`render`** - HTML for the page and the live fragment
//! - **`middleware`** - Cookie based client identification
//! - **`error`** - Backend error type and its HTTP conversion
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - livecount-server binary
//! ├── server/         - Initialization and state
//! ├── routes/         - Route configuration
//! ├── counter/        - Counter state and handlers
//! ├── realtime/       - Fan-out to streams
//! ├── persistence/    - Durable event log
//! ├── render/         - HTML views
//! ├── middleware/     - Request middleware
//! └── error/          - Error types
//! ```
//!
//! # Request Flow
//!
//! A mutation updates the counter, enqueues a `MutationEvent`, renders the
//! fragment once and hands it to the hub. Independently the batch writer
//! drains the queue into SQLite. Each stream registers a session with the
//! hub, sends the current state, then forwards hub-delivered patches until
//! the connection closes.
//!
//! # Thread Safety
//!
//! - The hub registry is owned by the hub task
//! - The pending batch is owned by the writer task
//! - The counter sits behind `Arc<tokio::sync::RwLock<_>>`
//! - Everything in `AppState` is cheap to clone

/// Server setup and configuration
#[cfg(feature = "ssr")]
pub mod server;

/// Route configuration
#[cfg(feature = "ssr")]
pub mod routes;

/// Shared counter and its handlers
#[cfg(feature = "ssr")]
pub mod counter;

/// Real-time update system
#[cfg(feature = "ssr")]
pub mod realtime;

/// Durable event log
#[cfg(feature = "ssr")]
pub mod persistence;

/// HTML rendering
#[cfg(feature = "ssr")]
pub mod render;

/// Backend error types
#[cfg(feature = "ssr")]
pub mod error;

/// Middleware for request processing
#[cfg(feature = "ssr")]
pub mod middleware;

/// Re-export commonly used types
#[cfg(feature = "ssr")]
pub use server::{create_app, App, AppState};
#[cfg(feature = "ssr")]
pub use counter::{CounterSnapshot, CounterState};
#[cfg(feature = "ssr")]
pub use realtime::{BroadcastHub, HubHandle, Patch, SubscriberSession};
#[cfg(feature = "ssr")]
pub use persistence::{BatchWriter, EventQueue, WriterReport};
#[cfg(feature = "ssr")]
pub use error::BackendError;
