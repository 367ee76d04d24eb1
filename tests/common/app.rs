//! App fixtures and HTTP helpers
//!
//! Tests drive the router in-process with `tower::ServiceExt::oneshot`;
//! no socket is opened.

use axum::{
    body::Body,
    http::{header, Method, Request, Response},
};
use std::time::Duration;
use tempfile::TempDir;

use livecount::backend::server::{create_app, App};
use livecount::shared::AppConfig;

/// Cookie header value identifying `id`
pub fn client_cookie(id: &str) -> String {
    format!("datastar-client-id={}", id)
}

/// App backed by a SQLite file in a temporary directory
///
/// The directory lives as long as the returned guard.
pub async fn spawn_test_app(flush_interval: Duration) -> (App, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let app = create_app(test_config(&dir, flush_interval))
        .await
        .expect("Failed to create app");
    (app, dir)
}

/// Configuration pointing at `dir/events.sqlite`
pub fn test_config(dir: &TempDir, flush_interval: Duration) -> AppConfig {
    AppConfig::builder()
        .database_url(database_url(dir))
        .flush_interval(flush_interval)
        .build()
        .expect("Invalid test config")
}

pub fn database_url(dir: &TempDir) -> String {
    format!("sqlite://{}", dir.path().join("events.sqlite").display())
}

/// Build a request, optionally carrying a client cookie
pub fn request(method: Method, uri: &str, client: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = client {
        builder = builder.header(header::COOKIE, client_cookie(id));
    }
    builder.body(Body::empty()).expect("Failed to build request")
}

/// Collect a response body as UTF-8
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}
