//! HTTP surface tests, driven in-process through the router

use axum::http::{header, Method, StatusCode};
use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use tokio::time::{timeout, Duration};
use tower::ServiceExt;

use livecount::backend::realtime::BroadcastHub;
use livecount::backend::routes::create_router;

use crate::common::{body_string, request, spawn_test_app};

const FLUSH: Duration = Duration::from_millis(50);

#[tokio::test]
async fn test_mutation_returns_no_content_and_sets_cookie() {
    let (app, _dir) = spawn_test_app(FLUSH).await;

    let response = app
        .router
        .clone()
        .oneshot(request(Method::POST, "/increment", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    crate::assert_contains!(cookie, "datastar-client-id=");
    crate::assert_contains!(cookie, "SameSite=Lax");

    app.shutdown().await;
}

#[tokio::test]
async fn test_known_client_is_not_reassigned() {
    let (app, _dir) = spawn_test_app(FLUSH).await;

    let response = app
        .router
        .clone()
        .oneshot(request(Method::POST, "/reset", Some("returning")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    app.shutdown().await;
}

#[tokio::test]
async fn test_health_reflects_mutations() {
    let (app, _dir) = spawn_test_app(FLUSH).await;

    for uri in ["/increment", "/increment", "/increment", "/decrement"] {
        let response = app
            .router
            .clone()
            .oneshot(request(Method::POST, uri, Some("client")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let response = app
        .router
        .clone()
        .oneshot(request(Method::GET, "/health", Some("client")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["counter"], 2);
    assert_eq!(body["subscribers"], 0);

    app.shutdown().await;
}

#[tokio::test]
async fn test_index_renders_page_for_client() {
    let (app, _dir) = spawn_test_app(FLUSH).await;

    app.router
        .clone()
        .oneshot(request(Method::POST, "/increment", Some("page-viewer")))
        .await
        .unwrap();
    let response = app
        .router
        .clone()
        .oneshot(request(Method::GET, "/", Some("page-viewer")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
    crate::assert_contains!(content_type, "text/html");

    let page = body_string(response).await;
    crate::assert_contains!(page, "You are <code>page-viewer</code>");
    crate::assert_contains!(page, r#"<span id="count">1</span>"#);
    crate::assert_contains!(page, "<li><code>page-viewer</code> increment</li>");

    app.shutdown().await;
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (app, _dir) = spawn_test_app(FLUSH).await;

    let response = app
        .router
        .clone()
        .oneshot(request(Method::GET, "/nope", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], 404);

    app.shutdown().await;
}

#[tokio::test]
async fn test_stream_sends_snapshot_then_updates() {
    let (app, _dir) = spawn_test_app(FLUSH).await;

    let response = app
        .router
        .clone()
        .oneshot(request(Method::GET, "/stream", Some("watcher")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );

    let mut body = response.into_body().into_data_stream();
    let first = timeout(Duration::from_secs(2), body.next()).await.unwrap().unwrap().unwrap();
    let first = String::from_utf8(first.to_vec()).unwrap();
    crate::assert_contains!(first, "event: datastar-patch-elements");
    crate::assert_contains!(first, r#"data: elements <main id="main" data-origin="watcher">"#);
    crate::assert_contains!(first, r#"<span id="count">0</span>"#);

    app.router
        .clone()
        .oneshot(request(Method::POST, "/increment", Some("clicker")))
        .await
        .unwrap();

    let second = timeout(Duration::from_secs(2), body.next()).await.unwrap().unwrap().unwrap();
    let second = String::from_utf8(second.to_vec()).unwrap();
    crate::assert_contains!(second, r#"data-origin="clicker""#);
    crate::assert_contains!(second, r#"<span id="count">1</span>"#);

    // Shutdown ends the open stream.
    let trigger = app.shutdown_handle();
    trigger.trigger();
    let end = timeout(Duration::from_secs(2), body.next()).await.unwrap();
    assert!(end.is_none());
    drop(body);

    app.shutdown().await;
}

#[tokio::test]
async fn test_health_is_unavailable_when_hub_stopped() {
    let (app, _dir) = spawn_test_app(FLUSH).await;

    // A hub whose loop never runs behaves like one that has stopped.
    let (stopped_hub, hub) = BroadcastHub::new(4);
    drop(stopped_hub);
    let mut state = app.state.clone();
    state.hub = hub;
    let router = create_router(state);

    let response = router
        .clone()
        .oneshot(request(Method::GET, "/health", Some("monitor")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], 503);
    crate::assert_contains!(body["error"].as_str().unwrap(), "not running");

    let response = router
        .oneshot(request(Method::GET, "/stream", Some("monitor")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    app.shutdown().await;
}
