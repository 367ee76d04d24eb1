/**
 * Batch Writer
 *
 * One background task drains the event queue into the persistent log. Events
 * accumulate in a local batch that is flushed when it reaches `batch_size`
 * or when the flush timer fires with a non-empty batch, whichever comes
 * first. When every queue handle is gone the remainder is flushed and the
 * task ends with a [`WriterReport`].
 *
 * A batch is handed to the store as one unit. If the store fails, the batch
 * is logged and dropped; the loop keeps running and later batches are
 * unaffected.
 */
use std::fmt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::backend::persistence::db::EventStore;
use crate::backend::persistence::queue::EventReceiver;
use crate::shared::MutationEvent;

/// Shortest flush period the timer accepts
const MIN_FLUSH_INTERVAL: Duration = Duration::from_millis(1);

/// What the writer did over its lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct WriterReport {
    pub batches_committed: u64,
    pub batches_failed: u64,
    pub events_persisted: u64,
    pub events_dropped: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlushReason {
    Size,
    Timer,
    Shutdown,
}

impl fmt::Display for FlushReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlushReason::Size => "size",
            FlushReason::Timer => "timer",
            FlushReason::Shutdown => "shutdown",
        })
    }
}

/// Drains the event queue into an [`EventStore`]
pub struct BatchWriter<S> {
    store: S,
    batch_size: usize,
    flush_interval: Duration,
}

impl<S: EventStore> BatchWriter<S> {
    pub fn new(store: S, batch_size: usize, flush_interval: Duration) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
            flush_interval: flush_interval.max(MIN_FLUSH_INTERVAL),
        }
    }

    /// Run the writer on a new task
    pub fn spawn(self, events: EventReceiver) -> JoinHandle<WriterReport> {
        tokio::spawn(self.run(events))
    }

    /// Consume events until the queue is closed and drained
    pub async fn run(self, mut events: EventReceiver) -> WriterReport {
        tracing::info!(
            "[Writer] Started batch_size={} flush_interval={:?}",
            self.batch_size,
            self.flush_interval
        );

        // First tick one full period from now, not immediately.
        let mut ticker = time::interval_at(Instant::now() + self.flush_interval, self.flush_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut batch: Vec<MutationEvent> = Vec::with_capacity(self.batch_size);
        let mut report = WriterReport::default();

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        batch.push(event);
                        if batch.len() >= self.batch_size {
                            self.flush(&mut batch, FlushReason::Size, &mut report).await;
                        }
                    }
                    None => {
                        self.flush(&mut batch, FlushReason::Shutdown, &mut report).await;
                        break;
                    }
                },
                _ = ticker.tick() => {
                    self.flush(&mut batch, FlushReason::Timer, &mut report).await;
                }
            }
        }

        tracing::info!(
            "[Writer] Stopped: {} batches committed ({} events), {} failed ({} events dropped)",
            report.batches_committed,
            report.events_persisted,
            report.batches_failed,
            report.events_dropped
        );
        report
    }

    async fn flush(
        &self,
        batch: &mut Vec<MutationEvent>,
        reason: FlushReason,
        report: &mut WriterReport,
    ) {
        if batch.is_empty() {
            return;
        }

        let pending = std::mem::replace(batch, Vec::with_capacity(self.batch_size));
        let count = pending.len() as u64;
        let started = Instant::now();

        match self.store.insert_batch(&pending).await {
            Ok(()) => {
                report.batches_committed += 1;
                report.events_persisted += count;
                tracing::debug!(
                    "[Writer] Committed {} events reason={} in {:?}",
                    count,
                    reason,
                    started.elapsed()
                );
            }
            Err(e) => {
                report.batches_failed += 1;
                report.events_dropped += count;
                tracing::error!(
                    "[Writer] Failed to persist {} events reason={}: {}",
                    count,
                    reason,
                    e
                );
            }
        }
    }
}
