/**
 * Stream Subscription Handler
 *
 * This module implements the Server-Sent Events handler for `GET /stream`.
 *
 * # Connection Lifecycle
 *
 * 1. Create a [`SubscriberSession`] for the caller's client id
 * 2. Register it with the hub (the response waits for the hub to apply it)
 * 3. Render the current state as the initial patch
 * 4. Stream the initial patch, then every hub-delivered patch
 *
 * Registering before rendering means a mutation that lands in between is
 * still delivered. The stream ends on client disconnect or server shutdown;
 * either way the session is dropped and leaves the hub.
 *
 * # Wire Format
 *
 * ```http
 * HTTP/1.1 200 OK
 * Content-Type: text/event-stream
 *
 * event: datastar-patch-elements
 * data: elements <main id="main" data-origin="...">
 * data: elements   ...
 * data: elements </main>
 * ```
 *
 * Keep-alive comments are sent while the counter is idle.
 */

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use std::convert::Infallible;
use tokio_stream::{Stream, StreamExt};

use crate::backend::error::BackendError;
use crate::backend::middleware::client_id::ClientId;
use crate::backend::realtime::session::{patch_stream, SubscriberSession};
use crate::backend::render::render_main;
use crate::backend::server::state::AppState;

/// Handle a stream subscription (GET /stream)
///
/// # Errors
///
/// * `503 Service Unavailable` - The broadcast hub is not running
pub async fn handle_stream(
    State(state): State<AppState>,
    client: ClientId,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, BackendError> {
    let mut session = SubscriberSession::new(client.as_str());
    state.hub.register_client(&mut session).await.map_err(|e| {
        tracing::warn!("[Stream] Could not register client {}: {}", client, e);
        e
    })?;
    tracing::info!("[Stream] Client {} connected (session {})", client, session.id());

    let snapshot = state.counter.read().await.snapshot();
    let initial = match render_main(client.as_str(), &snapshot) {
        Ok(patch) => Some(patch),
        Err(e) => {
            tracing::warn!("[Stream] Initial render failed for {}: {}", client, e);
            None
        }
    };

    let stream = patch_stream(session, initial, state.shutdown.clone())
        .map(|patch| Ok::<_, Infallible>(patch.to_sse_event()));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
