/**
 * Event Queue
 *
 * Bounded FIFO between the mutation handlers and the batch writer. Handlers
 * enqueue after the in-memory counter has changed; the writer task is the
 * only consumer. When the queue is full `enqueue` waits for room, so a slow
 * disk slows mutations down instead of losing events.
 */
use thiserror::Error;
use tokio::sync::mpsc;

use crate::shared::MutationEvent;

/// Returned when the writer is gone and the event could not be queued
#[derive(Debug, Error, Clone, PartialEq)]
#[error("event queue is closed, dropped {0:?} event from {1}")]
pub struct QueueClosed(pub crate::shared::CounterAction, pub String);

/// Producer side of the event queue
#[derive(Clone, Debug)]
pub struct EventQueue {
    tx: mpsc::Sender<MutationEvent>,
}

/// Consumer side, handed to the batch writer
pub type EventReceiver = mpsc::Receiver<MutationEvent>;

impl EventQueue {
    /// Create a queue holding at most `capacity` events
    pub fn bounded(capacity: usize) -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Append an event, waiting while the queue is full
    pub async fn enqueue(&self, event: MutationEvent) -> Result<(), QueueClosed> {
        self.tx
            .send(event)
            .await
            .map_err(|mpsc::error::SendError(event)| QueueClosed(event.action, event.client_id))
    }

    /// Events waiting to be picked up by the writer
    pub fn depth(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }
}
