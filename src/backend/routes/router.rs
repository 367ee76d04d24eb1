/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all routes and middleware into a single Axum router.
 *
 * # Routes
 *
 * - `GET /` - Full counter page
 * - `GET /stream` - Server-Sent Events stream of rendered patches
 * - `POST /increment`, `POST /decrement`, `POST /reset` - Mutations (204)
 * - `GET /health` - JSON health and counters
 *
 * # Middleware
 *
 * Every route, the fallback included, runs behind the client-id middleware
 * and the tower-http trace layer.
 */

use axum::{
    extract::FromRef,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

#[cfg(feature = "ssr")]
use crate::backend::counter::handlers::{
    handle_decrement, handle_health, handle_increment, handle_index, handle_reset,
};
#[cfg(feature = "ssr")]
use crate::backend::error::BackendError;
#[cfg(feature = "ssr")]
use crate::backend::middleware::client_id::{client_id_middleware, ClientCookie};
#[cfg(feature = "ssr")]
use crate::backend::realtime::subscription::handle_stream;
#[cfg(feature = "ssr")]
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Application state shared by every handler
#[cfg(feature = "ssr")]
pub fn create_router(app_state: AppState) -> Router<()> {
    let cookie = ClientCookie::from_ref(&app_state);

    Router::new()
        .route("/", get(handle_index))
        .route("/stream", get(handle_stream))
        .route("/increment", post(handle_increment))
        .route("/decrement", post(handle_decrement))
        .route("/reset", post(handle_reset))
        .route("/health", get(handle_health))
        .fallback(handle_not_found)
        .layer(from_fn_with_state(cookie, client_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[cfg(feature = "ssr")]
async fn handle_not_found() -> BackendError {
    BackendError::handler(axum::http::StatusCode::NOT_FOUND, "Not Found")
}
