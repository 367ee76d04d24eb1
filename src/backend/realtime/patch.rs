/**
 * Rendered Patches
 *
 * A `Patch` is an HTML fragment ready to be morphed into every viewer's
 * page. One rendered patch is shared by all sessions it is delivered to, so
 * it is reference counted rather than copied per subscriber.
 *
 * On the wire a patch becomes a Datastar `datastar-patch-elements`
 * Server-Sent Event whose data lines are each prefixed with `elements `.
 */
use axum::response::sse::Event;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// SSE event name understood by the Datastar client
pub const PATCH_ELEMENTS_EVENT: &str = "datastar-patch-elements";

/// Immutable, cheaply clonable HTML fragment
#[derive(Clone, PartialEq, Eq)]
pub struct Patch(Arc<str>);

impl Patch {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Datastar data payload: one `elements` line per markup line
    pub fn datastar_data(&self) -> String {
        self.0
            .lines()
            .map(|line| format!("elements {}", line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Convert into an axum SSE event
    pub fn to_sse_event(&self) -> Event {
        Event::default()
            .event(PATCH_ELEMENTS_EVENT)
            .data(self.datastar_data())
    }
}

impl Deref for Patch {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Patch {
    fn from(markup: String) -> Self {
        Self(Arc::from(markup))
    }
}

impl From<&str> for Patch {
    fn from(markup: &str) -> Self {
        Self(Arc::from(markup))
    }
}

impl fmt::Debug for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Patch").field("len", &self.0.len()).finish()
    }
}
