/**
 * Mutation Events
 *
 * A `MutationEvent` records one applied counter action. Request handlers
 * create it right after updating the in-memory counter and hand it to the
 * event queue; the batch writer consumes it exactly once and appends it to
 * the `counter_events` table.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::action::CounterAction;

/// Immutable record of a single counter mutation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MutationEvent {
    /// Client that issued the mutation
    pub client_id: String,
    /// The applied action
    pub action: CounterAction,
    /// When the mutation was applied (UTC)
    pub created_at: DateTime<Utc>,
}

impl MutationEvent {
    /// Create an event stamped with the current time
    pub fn new(client_id: impl Into<String>, action: CounterAction) -> Self {
        Self::at(client_id, action, Utc::now())
    }

    /// Create an event with an explicit timestamp
    pub fn at(client_id: impl Into<String>, action: CounterAction, created_at: DateTime<Utc>) -> Self {
        Self {
            client_id: client_id.into(),
            action,
            created_at,
        }
    }
}
