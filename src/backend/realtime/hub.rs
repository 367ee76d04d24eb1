/**
 * Broadcast Hub
 *
 * The hub is the single authority over which subscriber sessions are
 * listening and how much was last pushed to them. It runs as one tokio task
 * that owns the registry outright; everything else talks to it through a
 * cloneable [`HubHandle`].
 *
 * # Mailboxes
 *
 * - **control** (unbounded): register and unregister. It is unbounded so a
 *   session guard can unregister from `Drop` without awaiting.
 * - **intake** (bounded, `hub_capacity`): rendered patches and stats
 *   queries, processed in submission order. Producers wait only when this
 *   intake is full, never on a subscriber.
 *
 * Control messages are drained before the intake, so a registration that
 * completed before `broadcast_patch` was called is always visible to that
 * broadcast, and an unregistration is never followed by a delivery. A stats
 * query observes every broadcast submitted before it.
 *
 * # Delivery
 *
 * Every registered session has a single-slot mailbox. A broadcast offers
 * the patch to each slot without waiting; an unread patch is replaced by
 * the newer one, and sessions whose receiver is gone are pruned.
 */
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::backend::realtime::patch::Patch;
use crate::backend::realtime::slot::{Offer, SlotSender};

/// Identity of one subscriber session
pub type SessionId = Uuid;

/// Errors returned by hub operations that need an answer from the loop
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HubError {
    /// The hub loop has stopped
    #[error("broadcast hub is not running")]
    Closed,
    /// The session already holds a registration
    #[error("session {0} is already registered")]
    AlreadyRegistered(SessionId),
    /// The session was registered once and has since left; sessions are single-use
    #[error("session {0} has been unregistered and cannot register again")]
    SessionSpent(SessionId),
}

/// Counters maintained by the hub loop
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct HubStats {
    /// Sessions currently registered
    pub subscribers: usize,
    /// Broadcasts processed since start
    pub broadcasts: u64,
    /// Patches placed into a session slot
    pub delivered: u64,
    /// Unread patches replaced by a newer one
    pub superseded: u64,
    /// Sessions removed because their receiver was gone
    pub pruned: u64,
    /// Size in bytes of the last broadcast patch
    pub last_patch_len: Option<usize>,
}

enum ControlMessage {
    Register {
        id: SessionId,
        client_id: String,
        sender: SlotSender,
        ack: oneshot::Sender<()>,
    },
    Unregister {
        id: SessionId,
    },
}

enum IntakeMessage {
    Broadcast(Patch),
    Stats {
        reply: oneshot::Sender<HubStats>,
    },
    Sessions {
        reply: oneshot::Sender<Vec<SessionId>>,
    },
}

struct Subscriber {
    client_id: String,
    sender: SlotSender,
}

/// Cloneable front door to the hub loop
#[derive(Clone)]
pub struct HubHandle {
    control: mpsc::UnboundedSender<ControlMessage>,
    intake: mpsc::Sender<IntakeMessage>,
}

/// The hub loop state; owned by its task once spawned
pub struct BroadcastHub {
    control_rx: mpsc::UnboundedReceiver<ControlMessage>,
    intake_rx: mpsc::Receiver<IntakeMessage>,
    registry: HashMap<SessionId, Subscriber>,
    stats: HubStats,
}

impl BroadcastHub {
    /// Create a hub and its handle without starting the loop
    pub fn new(capacity: usize) -> (Self, HubHandle) {
        let (control, control_rx) = mpsc::unbounded_channel();
        let (intake, intake_rx) = mpsc::channel(capacity.max(1));
        let hub = Self {
            control_rx,
            intake_rx,
            registry: HashMap::new(),
            stats: HubStats::default(),
        };
        (hub, HubHandle { control, intake })
    }

    /// Create a hub and run its loop on a new task
    ///
    /// The loop ends once every [`HubHandle`] has been dropped.
    pub fn spawn(capacity: usize) -> (HubHandle, JoinHandle<()>) {
        let (hub, handle) = Self::new(capacity);
        let task = tokio::spawn(hub.run());
        (handle, task)
    }

    /// Run the control loop until all handles are gone
    pub async fn run(mut self) {
        tracing::info!("[Hub] Broadcast hub started");
        loop {
            tokio::select! {
                biased;
                message = self.control_rx.recv() => match message {
                    Some(message) => self.handle_control(message),
                    None => break,
                },
                message = self.intake_rx.recv() => match message {
                    Some(message) => self.handle_intake(message),
                    None => break,
                },
            }
        }
        tracing::info!(
            "[Hub] Broadcast hub stopped ({} sessions still registered)",
            self.registry.len()
        );
    }

    fn handle_control(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::Register {
                id,
                client_id,
                sender,
                ack,
            } => {
                tracing::info!("[Hub] Register session {} client={}", id, client_id);
                self.registry.insert(id, Subscriber { client_id, sender });
                self.stats.subscribers = self.registry.len();
                tracing::debug!("[Hub] {} sessions registered", self.registry.len());
                // The registering task may have given up waiting; the entry
                // is pruned on the next broadcast if so.
                let _ = ack.send(());
            }
            ControlMessage::Unregister { id } => {
                if let Some(subscriber) = self.registry.remove(&id) {
                    tracing::info!(
                        "[Hub] Unregister session {} client={}",
                        id,
                        subscriber.client_id
                    );
                }
                self.stats.subscribers = self.registry.len();
            }
        }
    }

    fn handle_intake(&mut self, message: IntakeMessage) {
        match message {
            IntakeMessage::Broadcast(patch) => self.fan_out(patch),
            IntakeMessage::Stats { reply } => {
                let _ = reply.send(self.stats.clone());
            }
            IntakeMessage::Sessions { reply } => {
                let _ = reply.send(self.registry.keys().copied().collect());
            }
        }
    }

    fn fan_out(&mut self, patch: Patch) {
        self.stats.broadcasts += 1;
        let mut delivered = 0usize;
        let mut closed = Vec::new();

        for (id, subscriber) in &self.registry {
            match subscriber.sender.offer(patch.clone()) {
                Offer::Delivered => delivered += 1,
                Offer::Superseded => {
                    delivered += 1;
                    self.stats.superseded += 1;
                    tracing::debug!(
                        "[Hub] Session {} is slow, replaced its unread patch",
                        id
                    );
                }
                Offer::Closed => closed.push(*id),
            }
        }

        for id in closed {
            self.registry.remove(&id);
            self.stats.pruned += 1;
            tracing::debug!("[Hub] Pruned closed session {}", id);
        }

        self.stats.delivered += delivered as u64;
        self.stats.subscribers = self.registry.len();
        self.stats.last_patch_len = Some(patch.len());
        tracing::debug!(
            "[Hub] Broadcast patch size={} to {} sessions",
            patch.len(),
            delivered
        );
    }
}

impl HubHandle {
    /// Register a session's mailbox with the hub
    ///
    /// Resolves once the hub loop has inserted the session, so any broadcast
    /// issued afterwards reaches it. The returned guard unregisters on drop.
    pub(crate) async fn register_slot(
        &self,
        id: SessionId,
        client_id: String,
        sender: SlotSender,
    ) -> Result<Registration, HubError> {
        let (ack, acked) = oneshot::channel();
        self.control
            .send(ControlMessage::Register {
                id,
                client_id,
                sender,
                ack,
            })
            .map_err(|_| HubError::Closed)?;
        acked.await.map_err(|_| HubError::Closed)?;
        Ok(Registration {
            id,
            hub: self.clone(),
        })
    }

    /// Remove a session from the registry
    ///
    /// Idempotent: unknown sessions are ignored. Never waits.
    pub fn unregister_client(&self, id: SessionId) {
        if self.control.send(ControlMessage::Unregister { id }).is_err() {
            tracing::debug!("[Hub] Unregister for {} after hub stopped", id);
        }
    }

    /// Submit a patch for delivery to every registered session
    ///
    /// Waits only if the hub intake is full. Never reports failure: if the
    /// hub has stopped the patch is logged and dropped.
    pub async fn broadcast_patch(&self, patch: Patch) {
        tracing::debug!("[Hub] Broadcast submitted size={}", patch.len());
        if self.intake.send(IntakeMessage::Broadcast(patch)).await.is_err() {
            tracing::warn!("[Hub] Broadcast dropped, hub is not running");
        }
    }

    /// Current hub counters
    pub async fn stats(&self) -> Result<HubStats, HubError> {
        let (reply, answer) = oneshot::channel();
        self.intake
            .send(IntakeMessage::Stats { reply })
            .await
            .map_err(|_| HubError::Closed)?;
        answer.await.map_err(|_| HubError::Closed)
    }

    /// Ids of the sessions currently registered, in no particular order
    pub async fn sessions(&self) -> Result<Vec<SessionId>, HubError> {
        let (reply, answer) = oneshot::channel();
        self.intake
            .send(IntakeMessage::Sessions { reply })
            .await
            .map_err(|_| HubError::Closed)?;
        answer.await.map_err(|_| HubError::Closed)
    }
}

/// Scoped registration; unregisters its session when dropped
pub struct Registration {
    id: SessionId,
    hub: HubHandle,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.hub.unregister_client(self.id);
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration").field("id", &self.id).finish()
    }
}
