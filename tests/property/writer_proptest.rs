//! Property-based tests for the batch writer flush policy

use proptest::prelude::*;
use std::time::Duration;

use livecount::backend::persistence::{BatchWriter, EventQueue};
use livecount::shared::{CounterAction, MutationEvent};

use crate::common::RecordingStore;

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn test_batches_are_full_except_the_last(events in 0usize..80, batch_size in 1usize..16) {
        let store = RecordingStore::default();
        let sizes = paused_runtime().block_on({
            let store = store.clone();
            async move {
                let (queue, receiver) = EventQueue::bounded(128);
                let task = BatchWriter::new(store.clone(), batch_size, Duration::from_secs(1))
                    .spawn(receiver);

                for n in 0..events {
                    queue
                        .enqueue(MutationEvent::new(format!("c{}", n), CounterAction::Increment))
                        .await
                        .unwrap();
                }
                // No tick has elapsed: only the threshold has flushed so far.
                tokio::task::yield_now().await;
                tokio::time::sleep(Duration::from_millis(500)).await;
                let before_tick = store.batch_sizes();

                tokio::time::sleep(Duration::from_millis(600)).await;
                drop(queue);
                task.await.unwrap();
                (before_tick, store.batch_sizes())
            }
        });

        let (before_tick, after) = sizes;
        prop_assert_eq!(before_tick.len(), events / batch_size);
        prop_assert!(before_tick.iter().all(|&size| size == batch_size));

        prop_assert_eq!(after.len(), events.div_ceil(batch_size));
        prop_assert!(after.iter().all(|&size| size <= batch_size));
        prop_assert_eq!(after.iter().sum::<usize>(), events);

        let order: Vec<String> = store.events().into_iter().map(|e| e.client_id).collect();
        let expected: Vec<String> = (0..events).map(|n| format!("c{}", n)).collect();
        prop_assert_eq!(order, expected);
    }
}
