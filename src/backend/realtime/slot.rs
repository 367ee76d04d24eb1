/**
 * Single-Slot Delivery Mailbox
 *
 * Each subscriber session owns the receiving half of a mailbox that holds at
 * most one patch. The broadcast hub owns the sending half and never waits on
 * it: `offer` either fills the empty slot, replaces a patch the subscriber
 * has not read yet, or reports that the subscriber is gone.
 *
 * Replacing instead of queueing keeps memory at one patch per session no
 * matter how fast broadcasts arrive, and a slow subscriber only ever reads
 * the most recent state.
 */
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::backend::realtime::patch::Patch;

/// Result of offering a patch to a mailbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// The slot was empty and now holds the patch
    Delivered,
    /// An unread patch was dropped in favour of the new one
    Superseded,
    /// The receiving session is gone; nothing was stored
    Closed,
}

struct Shared {
    slot: Mutex<Option<Patch>>,
    notify: Notify,
    receiver_alive: AtomicBool,
    sender_alive: AtomicBool,
}

/// Sending half, held by the hub registry
pub struct SlotSender {
    shared: Arc<Shared>,
}

/// Receiving half, held by a subscriber session
pub struct SlotReceiver {
    shared: Arc<Shared>,
}

/// Create a connected mailbox pair
pub fn channel() -> (SlotSender, SlotReceiver) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(None),
        notify: Notify::new(),
        receiver_alive: AtomicBool::new(true),
        sender_alive: AtomicBool::new(true),
    });
    (
        SlotSender {
            shared: Arc::clone(&shared),
        },
        SlotReceiver { shared },
    )
}

impl SlotSender {
    /// Store `patch` without waiting
    pub fn offer(&self, patch: Patch) -> Offer {
        if !self.shared.receiver_alive.load(Ordering::Acquire) {
            return Offer::Closed;
        }
        let previous = {
            let mut slot = self.shared.slot.lock().unwrap_or_else(|e| e.into_inner());
            slot.replace(patch)
        };
        self.shared.notify.notify_one();
        if previous.is_some() {
            Offer::Superseded
        } else {
            Offer::Delivered
        }
    }

    /// Whether the receiving session has gone away
    pub fn is_closed(&self) -> bool {
        !self.shared.receiver_alive.load(Ordering::Acquire)
    }
}

impl Drop for SlotSender {
    fn drop(&mut self) {
        self.shared.sender_alive.store(false, Ordering::Release);
        self.shared.notify.notify_one();
    }
}

impl SlotReceiver {
    /// Wait for the next patch
    ///
    /// Returns `None` once the sending half is dropped and the slot is empty.
    pub async fn recv(&mut self) -> Option<Patch> {
        loop {
            if let Some(patch) = self.try_recv() {
                return Some(patch);
            }
            if !self.shared.sender_alive.load(Ordering::Acquire) {
                return self.try_recv();
            }
            // A permit stored by `offer` between `try_recv` and here wakes
            // this immediately.
            self.shared.notify.notified().await;
        }
    }

    /// Take the pending patch, if any
    pub fn try_recv(&mut self) -> Option<Patch> {
        self.shared
            .slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }
}

impl Drop for SlotReceiver {
    fn drop(&mut self) {
        self.shared.receiver_alive.store(false, Ordering::Release);
        // Release the pending patch now rather than when the hub prunes.
        self.shared
            .slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
    }
}
