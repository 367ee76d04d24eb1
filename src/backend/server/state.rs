/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct is the central state container, holding:
 * - The shared counter (value and recent-action history)
 * - The broadcast hub handle
 * - The event queue feeding the batch writer
 * - The SQLite pool (read-only use by handlers)
 * - The server configuration
 * - The shutdown signal observed by open streams
 *
 * Nothing here is a global: `create_app` builds one `AppState` and the
 * router clones it into every handler.
 *
 * # Example
 *
 * ```rust,no_run
 * use livecount::backend::server::state::AppState;
 * use axum::extract::State;
 *
 * async fn handler(State(state): State<AppState>) {
 *     let value = state.counter.read().await.value();
 *     // ...
 * }
 * ```
 */

#[cfg(feature = "ssr")]
use axum::extract::FromRef;
#[cfg(feature = "ssr")]
use sqlx::SqlitePool;
#[cfg(feature = "ssr")]
use std::sync::Arc;
#[cfg(feature = "ssr")]
use tokio::sync::watch;

#[cfg(feature = "ssr")]
use crate::backend::counter::state::SharedCounter;
#[cfg(feature = "ssr")]
use crate::backend::persistence::EventQueue;
#[cfg(feature = "ssr")]
use crate::backend::realtime::HubHandle;
#[cfg(feature = "ssr")]
use crate::shared::AppConfig;

/// Application state shared by every handler
///
/// # Fields
///
/// * `counter` - Live counter behind a `tokio::sync::RwLock`
/// * `hub` - Handle to the broadcast hub loop
/// * `events` - Producer side of the persistent event queue
/// * `db_pool` - SQLite pool of the event log
/// * `config` - Validated configuration
/// * `shutdown` - Flips to `true` when the server begins shutting down
#[cfg(feature = "ssr")]
#[derive(Clone)]
pub struct AppState {
    pub counter: SharedCounter,
    pub hub: HubHandle,
    pub events: EventQueue,
    pub db_pool: SqlitePool,
    pub config: Arc<AppConfig>,
    pub shutdown: watch::Receiver<bool>,
}

#[cfg(feature = "ssr")]
impl FromRef<AppState> for SharedCounter {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.counter.clone()
    }
}

#[cfg(feature = "ssr")]
impl FromRef<AppState> for HubHandle {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.hub.clone()
    }
}

#[cfg(feature = "ssr")]
impl FromRef<AppState> for EventQueue {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.events.clone()
    }
}

#[cfg(feature = "ssr")]
impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
