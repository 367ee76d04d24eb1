/**
 * Server Initialization
 *
 * This module builds the running application: state, background tasks and
 * the router, and tears them down again in the right order.
 *
 * # Initialization Process
 *
 * 1. Validate the configuration
 * 2. Open the SQLite event log and apply the schema
 * 3. Spawn the broadcast hub loop
 * 4. Create the event queue and spawn the batch writer on it
 * 5. Create the counter state and the shutdown signal
 * 6. Create the router
 *
 * # Shutdown
 *
 * [`App::shutdown`] signals every open stream to end, drops the app's queue
 * handles so the writer flushes its remainder, and waits for the writer's
 * report. Call it after the HTTP server has stopped serving.
 */

#[cfg(feature = "ssr")]
use axum::Router;
#[cfg(feature = "ssr")]
use std::sync::Arc;
#[cfg(feature = "ssr")]
use std::time::Duration;
#[cfg(feature = "ssr")]
use tokio::sync::watch;
#[cfg(feature = "ssr")]
use tokio::task::JoinHandle;

#[cfg(feature = "ssr")]
use crate::backend::counter::state::CounterState;
#[cfg(feature = "ssr")]
use crate::backend::error::BackendError;
#[cfg(feature = "ssr")]
use crate::backend::persistence::{BatchWriter, EventQueue, SqliteEventStore, WriterReport};
#[cfg(feature = "ssr")]
use crate::backend::realtime::BroadcastHub;
#[cfg(feature = "ssr")]
use crate::backend::routes::router::create_router;
#[cfg(feature = "ssr")]
use crate::backend::server::config::load_database;
#[cfg(feature = "ssr")]
use crate::backend::server::state::AppState;
#[cfg(feature = "ssr")]
use crate::shared::AppConfig;

/// How long shutdown waits for the hub loop after streams were told to end
#[cfg(feature = "ssr")]
const HUB_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Cloneable trigger for the shutdown signal
#[cfg(feature = "ssr")]
#[derive(Clone)]
pub struct ShutdownHandle(Arc<watch::Sender<bool>>);

#[cfg(feature = "ssr")]
impl ShutdownHandle {
    /// Tell every open stream to end
    pub fn trigger(&self) {
        if !self.0.send_replace(true) {
            tracing::info!("[Server] Shutdown signalled");
        }
    }
}

/// A constructed application and its background tasks
#[cfg(feature = "ssr")]
pub struct App {
    /// Router to serve; already carries the state
    pub router: Router,
    pub state: AppState,
    shutdown: ShutdownHandle,
    hub_task: JoinHandle<()>,
    writer_task: JoinHandle<WriterReport>,
}

/// Create and configure the application
///
/// # Errors
///
/// Invalid configuration and database open or schema failures are returned
/// as [`BackendError`]; they are fatal to startup.
#[cfg(feature = "ssr")]
pub async fn create_app(config: AppConfig) -> Result<App, BackendError> {
    tracing::info!("[Server] Initializing livecount backend");

    // Step 1: Validate configuration
    config.validate()?;
    let config = Arc::new(config);

    // Step 2: Open the event log
    let db_pool = load_database(&config).await?;

    // Step 3: Broadcast hub
    let (hub, hub_task) = BroadcastHub::spawn(config.hub_capacity);

    // Step 4: Event queue and batch writer
    let (events, receiver) = EventQueue::bounded(config.event_queue_capacity);
    let writer = BatchWriter::new(
        SqliteEventStore::new(db_pool.clone()),
        config.batch_size,
        config.flush_interval,
    );
    let writer_task = writer.spawn(receiver);

    // Step 5: Counter state and shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let state = AppState {
        counter: CounterState::shared(config.history_limit),
        hub,
        events,
        db_pool,
        config,
        shutdown: shutdown_rx,
    };

    // Step 6: Router
    let router = create_router(state.clone());

    tracing::info!(
        "[Server] Ready (queue={}, batch={}, flush={:?}, hub={})",
        state.config.event_queue_capacity,
        state.config.batch_size,
        state.config.flush_interval,
        state.config.hub_capacity
    );

    Ok(App {
        router,
        state,
        shutdown: ShutdownHandle(Arc::new(shutdown_tx)),
        hub_task,
        writer_task,
    })
}

#[cfg(feature = "ssr")]
impl App {
    /// Trigger usable from a graceful-shutdown future
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Stop the background tasks and return the writer's report
    ///
    /// Every other clone of the router or state must already be dropped,
    /// otherwise the event queue stays open and the writer keeps waiting.
    pub async fn shutdown(self) -> WriterReport {
        let App {
            router,
            state,
            shutdown,
            hub_task,
            writer_task,
        } = self;

        shutdown.trigger();
        let db_pool = state.db_pool.clone();
        drop(router);
        drop(state);

        let report = match writer_task.await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("[Server] Batch writer task failed: {}", e);
                WriterReport::default()
            }
        };

        match tokio::time::timeout(HUB_STOP_TIMEOUT, hub_task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("[Server] Hub task failed: {}", e),
            Err(_) => tracing::warn!("[Server] Hub still running after {:?}", HUB_STOP_TIMEOUT),
        }

        db_pool.close().await;
        tracing::info!(
            "[Server] Shutdown complete: {} events persisted, {} dropped",
            report.events_persisted,
            report.events_dropped
        );
        report
    }
}
