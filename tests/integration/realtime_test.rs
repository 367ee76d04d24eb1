//! Broadcast hub and subscriber session integration tests

use pretty_assertions::assert_eq;
use tokio::sync::watch;
use tokio::time::{timeout, Duration};
use tokio_stream::StreamExt;

use livecount::backend::counter::CounterState;
use livecount::backend::realtime::{patch_stream, BroadcastHub, Patch, SubscriberSession};
use livecount::backend::render::render_main;
use livecount::shared::CounterAction;

#[tokio::test]
async fn test_slow_viewer_skips_to_latest_patch() {
    let (hub, _task) = BroadcastHub::spawn(16);
    let mut a = SubscriberSession::new("viewer-a");
    let mut b = SubscriberSession::new("viewer-b");
    crate::assert_ok!(hub.register_client(&mut a).await);
    crate::assert_ok!(hub.register_client(&mut b).await);

    hub.broadcast_patch(Patch::from("P1")).await;
    // B drains promptly; A leaves P1 unread.
    assert_eq!(b.recv().await.unwrap().as_str(), "P1");

    hub.broadcast_patch(Patch::from("P2")).await;
    let stats = crate::assert_ok!(hub.stats().await);
    assert_eq!(stats.superseded, 1);
    assert_eq!(stats.delivered, 4);

    assert_eq!(a.recv().await.unwrap().as_str(), "P2");
    assert!(a.try_recv().is_none());
    assert_eq!(b.recv().await.unwrap().as_str(), "P2");
}

#[tokio::test]
async fn test_disconnected_viewer_is_pruned_or_unregistered() {
    let (hub, _task) = BroadcastHub::spawn(16);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut staying = SubscriberSession::new("stay");
    let mut leaving = SubscriberSession::new("leave");
    hub.register_client(&mut staying).await.unwrap();
    hub.register_client(&mut leaving).await.unwrap();
    let leaving_stream = patch_stream(leaving, None, shutdown_rx);

    drop(leaving_stream);
    hub.broadcast_patch(Patch::from("after")).await;

    let sessions = hub.sessions().await.unwrap();
    assert_eq!(sessions, vec![staying.id()]);
    assert_eq!(staying.recv().await.unwrap().as_str(), "after");
}

#[tokio::test]
async fn test_broadcasts_arrive_in_issue_order() {
    let (hub, _task) = BroadcastHub::spawn(16);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut session = SubscriberSession::new("ordered");
    hub.register_client(&mut session).await.unwrap();

    let stream = patch_stream(session, None, shutdown_rx);
    tokio::pin!(stream);

    let mut last = 0;
    for n in 1..=20u32 {
        hub.broadcast_patch(Patch::from(n.to_string())).await;
        if n % 3 == 0 {
            let got: u32 = timeout(Duration::from_secs(1), stream.next())
                .await
                .unwrap()
                .unwrap()
                .as_str()
                .parse()
                .unwrap();
            assert!(got > last, "{} arrived after {}", got, last);
            last = got;
        }
    }
}

#[tokio::test]
async fn test_shutdown_signal_ends_every_stream() {
    let (hub, _task) = BroadcastHub::spawn(16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut streams = Vec::new();
    for n in 0..3 {
        let mut session = SubscriberSession::new(format!("viewer-{}", n));
        hub.register_client(&mut session).await.unwrap();
        streams.push(Box::pin(patch_stream(session, None, shutdown_rx.clone())));
    }

    shutdown_tx.send(true).unwrap();
    for stream in streams.iter_mut() {
        let end = timeout(Duration::from_secs(1), stream.next()).await.unwrap();
        assert!(end.is_none());
    }
    drop(streams);
    assert_eq!(hub.stats().await.unwrap().subscribers, 0);
}

#[tokio::test]
async fn test_update_between_register_and_snapshot_is_not_lost() {
    let (hub, _task) = BroadcastHub::spawn(16);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let counter = CounterState::shared(10);

    let mut session = SubscriberSession::new("late-joiner");
    hub.register_client(&mut session).await.unwrap();

    // A mutation lands after registration but before the initial render.
    let mutated = {
        let mut counter = counter.write().await;
        counter.apply_action(CounterAction::Increment, "clicker");
        counter.snapshot()
    };
    hub.broadcast_patch(render_main("clicker", &mutated).unwrap()).await;

    let snapshot = counter.read().await.snapshot();
    let initial = render_main("late-joiner", &snapshot).unwrap();
    let stream = patch_stream(session, Some(initial), shutdown_rx);
    tokio::pin!(stream);

    let first = stream.next().await.unwrap();
    crate::assert_contains!(first.as_str(), r#"<span id="count">1</span>"#);
    let second = timeout(Duration::from_secs(1), stream.next())
        .await
        .unwrap()
        .unwrap();
    crate::assert_contains!(second.as_str(), r#"data-origin="clicker""#);
    crate::assert_contains!(second.as_str(), r#"<span id="count">1</span>"#);
}
