/**
 * Subscriber Sessions
 *
 * A `SubscriberSession` is the delivery endpoint of one streaming
 * connection. It owns the receiving half of a single-slot mailbox and,
 * once registered, the [`Registration`] guard that keeps it in the hub.
 *
 * The session is owned by the connection's response stream. Whatever ends
 * the stream (client disconnect, server shutdown, an error or a panic in
 * the body) drops the session, which drops the guard, which unregisters it
 * from the hub. Nothing else needs to remember to clean up.
 *
 * # Streaming loop
 *
 * [`patch_stream`] yields the initial snapshot first (if it rendered), then
 * waits for either the next hub-delivered patch or the shutdown signal.
 * Registration happens before the initial snapshot is rendered, so an
 * update landing between the two is never lost: at worst the viewer sees
 * the same state twice.
 */
use futures_util::stream::{self, Stream};
use tokio::sync::watch;
use uuid::Uuid;

use crate::backend::realtime::hub::{HubError, HubHandle, Registration, SessionId};
use crate::backend::realtime::patch::Patch;
use crate::backend::realtime::slot::{self, SlotReceiver, SlotSender};

/// Delivery endpoint of one streaming connection
pub struct SubscriberSession {
    id: SessionId,
    client_id: String,
    sender: Option<SlotSender>,
    receiver: SlotReceiver,
    registration: Option<Registration>,
}

impl SubscriberSession {
    /// Create an unregistered session for `client_id`
    pub fn new(client_id: impl Into<String>) -> Self {
        let (sender, receiver) = slot::channel();
        Self {
            id: Uuid::new_v4(),
            client_id: client_id.into(),
            sender: Some(sender),
            receiver,
            registration: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn is_registered(&self) -> bool {
        self.registration.is_some()
    }

    /// Wait for the next delivered patch
    ///
    /// Returns `None` once the hub has stopped.
    pub async fn recv(&mut self) -> Option<Patch> {
        self.receiver.recv().await
    }

    /// Take the pending patch without waiting
    pub fn try_recv(&mut self) -> Option<Patch> {
        self.receiver.try_recv()
    }

    /// Leave the hub now instead of when the session is dropped
    ///
    /// Sessions are single-use: an unregistered session cannot register
    /// again, open a new one instead.
    pub fn unregister(&mut self) {
        // Dropping the guard sends the unregistration.
        self.registration.take();
    }
}

impl Drop for SubscriberSession {
    fn drop(&mut self) {
        tracing::debug!(
            "[Stream] Session {} for client {} closed",
            self.id,
            self.client_id
        );
    }
}

impl HubHandle {
    /// Register `session` so future broadcasts reach it
    ///
    /// Resolves after the hub has applied the registration. The session
    /// unregisters itself when dropped or when [`SubscriberSession::unregister`]
    /// is called.
    pub async fn register_client(&self, session: &mut SubscriberSession) -> Result<(), HubError> {
        let sender = match session.sender.take() {
            Some(sender) => sender,
            None if session.registration.is_some() => {
                return Err(HubError::AlreadyRegistered(session.id))
            }
            None => return Err(HubError::SessionSpent(session.id)),
        };
        let registration = self
            .register_slot(session.id, session.client_id.clone(), sender)
            .await?;
        session.registration = Some(registration);
        Ok(())
    }
}

struct StreamState {
    session: SubscriberSession,
    initial: Option<Patch>,
    shutdown: watch::Receiver<bool>,
}

/// Drive a registered session as a stream of patches
///
/// The stream ends when the hub stops or `shutdown` flips to `true` (or its
/// sender is dropped). Dropping the stream unregisters the session.
pub fn patch_stream(
    session: SubscriberSession,
    initial: Option<Patch>,
    shutdown: watch::Receiver<bool>,
) -> impl Stream<Item = Patch> {
    let state = StreamState {
        session,
        initial,
        shutdown,
    };

    stream::unfold(state, |mut state| async move {
        if let Some(patch) = state.initial.take() {
            tracing::debug!(
                "[Stream] Initial patch client={} size={}",
                state.session.client_id,
                patch.len()
            );
            return Some((patch, state));
        }

        if *state.shutdown.borrow() {
            return None;
        }

        let next = tokio::select! {
            patch = state.session.recv() => patch,
            _ = state.shutdown.changed() => {
                tracing::debug!(
                    "[Stream] Shutdown signalled, closing session {}",
                    state.session.id
                );
                None
            }
        };

        next.map(|patch| (patch, state))
    })
}
