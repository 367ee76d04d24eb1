/**
 * Counter Actions
 *
 * This module defines the three mutations a viewer can apply to the shared
 * counter, and the record kept in the recent-action history.
 *
 * Actions are stored in the event log by their lowercase name
 * (`increment`, `decrement`, `reset`), which is also their JSON form.
 */
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::error::SharedError;

/// Kind of mutation applied to the counter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CounterAction {
    /// Add one to the counter
    Increment,
    /// Subtract one from the counter
    Decrement,
    /// Set the counter back to zero
    Reset,
}

impl CounterAction {
    /// Stable name used in the event log and in routes
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increment => "increment",
            Self::Decrement => "decrement",
            Self::Reset => "reset",
        }
    }

    /// Apply this action to a counter value
    pub fn apply(&self, value: i64) -> i64 {
        match self {
            Self::Increment => value.wrapping_add(1),
            Self::Decrement => value.wrapping_sub(1),
            Self::Reset => 0,
        }
    }
}

impl fmt::Display for CounterAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CounterAction {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "increment" => Ok(Self::Increment),
            "decrement" => Ok(Self::Decrement),
            "reset" => Ok(Self::Reset),
            other => Err(SharedError::validation(
                "action",
                format!("unknown counter action '{}'", other),
            )),
        }
    }
}

/// One entry of the recent-action history shown to viewers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionRecord {
    /// Client that issued the action
    pub client_id: String,
    /// What the client did
    pub action: CounterAction,
}

impl ActionRecord {
    pub fn new(client_id: impl Into<String>, action: CounterAction) -> Self {
        Self {
            client_id: client_id.into(),
            action,
        }
    }
}
