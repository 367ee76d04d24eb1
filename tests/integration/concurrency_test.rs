//! Concurrent mutations: viewers and the event log converge on the final state

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use std::time::Duration;
use tower::ServiceExt;

use livecount::backend::persistence::{open_pool, recent_events};
use livecount::backend::realtime::SubscriberSession;

use crate::common::{database_url, request, spawn_test_app};

const ROUNDS: usize = 10;
const MUTATIONS: usize = 64;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_mutations_deliver_final_value() {
    for round in 0..ROUNDS {
        let (app, _dir) = spawn_test_app(Duration::from_millis(50)).await;
        let mut viewer = SubscriberSession::new("viewer");
        crate::assert_ok!(app.state.hub.register_client(&mut viewer).await);

        let mut tasks = Vec::with_capacity(MUTATIONS);
        for n in 0..MUTATIONS {
            let router = app.router.clone();
            let uri = if n % 3 == 2 { "/decrement" } else { "/increment" };
            let client = format!("client-{}", n);
            tasks.push(tokio::spawn(async move {
                router
                    .oneshot(request(Method::POST, uri, Some(&client)))
                    .await
                    .unwrap()
                    .status()
            }));
        }
        for task in tasks {
            assert_eq!(task.await.unwrap(), StatusCode::NO_CONTENT);
        }

        // Every broadcast submitted so far is fanned out before stats answer.
        crate::assert_ok!(app.state.hub.stats().await);
        let value = app.state.counter.read().await.value();
        let last = viewer.try_recv().expect("viewer received no patch");
        crate::assert_contains!(
            last.as_str(),
            &format!(r#"<span id="count">{}</span>"#, value)
        );
        assert_eq!(value, 22, "round {}", round);

        drop(viewer);
        app.shutdown().await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_event_log_follows_applied_order() {
    let (app, dir) = spawn_test_app(Duration::from_millis(50)).await;

    let mut tasks = Vec::with_capacity(MUTATIONS);
    for n in 0..MUTATIONS {
        let router = app.router.clone();
        let client = format!("client-{}", n);
        tasks.push(tokio::spawn(async move {
            router
                .oneshot(request(Method::POST, "/increment", Some(&client)))
                .await
                .unwrap()
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    // Counter history is oldest first; the log query is newest first.
    let history: Vec<String> = app
        .state
        .counter
        .read()
        .await
        .snapshot()
        .recent_actions
        .into_iter()
        .rev()
        .map(|record| record.client_id)
        .collect();
    assert!(!history.is_empty());

    let report = app.shutdown().await;
    assert_eq!(report.events_persisted, MUTATIONS as u64);

    let pool = crate::assert_ok!(open_pool(&database_url(&dir)).await);
    let logged: Vec<String> = recent_events(&pool, history.len() as u32)
        .await
        .unwrap()
        .into_iter()
        .map(|event| event.client_id)
        .collect();
    assert_eq!(logged, history);
}
