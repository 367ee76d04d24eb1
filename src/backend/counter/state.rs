use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::shared::config::DEFAULT_HISTORY_LIMIT;
use crate::shared::{ActionRecord, CounterAction};

/// Counter state shared by every handler
pub type SharedCounter = Arc<RwLock<CounterState>>;

/// Consistent copy of the counter taken under one lock
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CounterSnapshot {
    pub value: i64,
    /// Oldest first
    pub recent_actions: Vec<ActionRecord>,
}

/// The live counter and its bounded action history
#[derive(Debug, Clone)]
pub struct CounterState {
    value: i64,
    history: VecDeque<ActionRecord>,
    history_limit: usize,
}

impl CounterState {
    pub fn new(history_limit: usize) -> Self {
        Self {
            value: 0,
            history: VecDeque::with_capacity(history_limit),
            history_limit,
        }
    }

    pub fn shared(history_limit: usize) -> SharedCounter {
        Arc::new(RwLock::new(Self::new(history_limit)))
    }

    /// Apply `action` on behalf of `client_id` and return the new value
    pub fn apply_action(&mut self, action: CounterAction, client_id: impl Into<String>) -> i64 {
        self.value = action.apply(self.value);
        self.history.push_back(ActionRecord::new(client_id, action));
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
        self.value
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            value: self.value,
            recent_actions: self.history.iter().cloned().collect(),
        }
    }
}

impl Default for CounterState {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
