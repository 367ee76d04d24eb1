//! In-memory event store for writer tests

use std::sync::{Arc, Mutex};

use livecount::backend::persistence::{EventStore, StoreError};
use livecount::shared::MutationEvent;

/// Records every committed batch; never fails
#[derive(Clone, Default)]
pub struct RecordingStore {
    batches: Arc<Mutex<Vec<Vec<MutationEvent>>>>,
}

impl RecordingStore {
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().iter().map(Vec::len).collect()
    }

    pub fn events(&self) -> Vec<MutationEvent> {
        self.batches.lock().unwrap().iter().flatten().cloned().collect()
    }
}

impl EventStore for RecordingStore {
    async fn insert_batch(&self, events: &[MutationEvent]) -> Result<(), StoreError> {
        self.batches.lock().unwrap().push(events.to_vec());
        Ok(())
    }
}
