/**
 * Counter Handlers
 *
 * HTTP handlers for the counter page and its mutations.
 *
 * # Mutation Flow
 *
 * A mutation applies the action to the in-memory counter, takes a snapshot
 * under the same lock, enqueues a [`MutationEvent`] for the batch writer,
 * renders the `<main>` fragment once and submits it to the broadcast hub.
 * The counter lock is released only after the submission, so the last patch
 * the hub fans out always carries the latest value and the event log
 * matches the order actions were applied.
 * The response is always `204 No Content` once the counter has changed:
 * a closed queue or a render failure is logged, never reported to the
 * caller.
 */
use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    Json,
};
use serde::Serialize;

use crate::backend::counter::state::SharedCounter;
use crate::backend::error::BackendError;
use crate::backend::middleware::client_id::ClientId;
use crate::backend::persistence::count_events;
use crate::backend::render::{render_index, render_main};
use crate::backend::server::state::AppState;
use crate::shared::{CounterAction, MutationEvent};

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub counter: i64,
    pub subscribers: usize,
    pub patches_delivered: u64,
    /// Unread patches replaced by a newer one
    pub patches_dropped: u64,
    pub queue_depth: usize,
    pub events_logged: i64,
}

/// Full page (GET /)
pub async fn handle_index(
    State(counter): State<SharedCounter>,
    client: ClientId,
) -> Result<Html<String>, BackendError> {
    let snapshot = counter.read().await.snapshot();
    let page = render_index(client.as_str(), &snapshot)?;
    Ok(Html(page))
}

/// POST /increment
pub async fn handle_increment(State(state): State<AppState>, client: ClientId) -> StatusCode {
    apply_mutation(&state, client, CounterAction::Increment).await
}

/// POST /decrement
pub async fn handle_decrement(State(state): State<AppState>, client: ClientId) -> StatusCode {
    apply_mutation(&state, client, CounterAction::Decrement).await
}

/// POST /reset
pub async fn handle_reset(State(state): State<AppState>, client: ClientId) -> StatusCode {
    apply_mutation(&state, client, CounterAction::Reset).await
}

async fn apply_mutation(state: &AppState, client: ClientId, action: CounterAction) -> StatusCode {
    // The write guard is held until the event is queued and the patch is in
    // the hub intake, so both follow the order in which actions were applied.
    let mut counter = state.counter.write().await;
    let value = counter.apply_action(action, client.as_str());
    let snapshot = counter.snapshot();
    tracing::info!("[Counter] action={} client={} value={}", action, client, value);

    if let Err(e) = state
        .events
        .enqueue(MutationEvent::new(client.as_str(), action))
        .await
    {
        tracing::warn!("[Counter] Event not logged: {}", e);
    }

    match render_main(client.as_str(), &snapshot) {
        Ok(patch) => state.hub.broadcast_patch(patch).await,
        Err(e) => tracing::warn!("[Counter] Render failed, skipping broadcast: {}", e),
    }
    drop(counter);

    StatusCode::NO_CONTENT
}

/// Health and counters (GET /health)
pub async fn handle_health(State(state): State<AppState>) -> Result<Json<HealthReport>, BackendError> {
    let counter = state.counter.read().await.value();
    let stats = state.hub.stats().await?;
    let events_logged = count_events(&state.db_pool).await?;

    Ok(Json(HealthReport {
        status: "ok",
        counter,
        subscribers: stats.subscribers,
        patches_delivered: stats.delivered,
        patches_dropped: stats.superseded,
        queue_depth: state.events.depth(),
        events_logged,
    }))
}
