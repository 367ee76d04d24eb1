//! Real-time Update Module
//!
//! Live fan-out of rendered patches to every open stream.
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── patch.rs        - Shared HTML patch and its SSE encoding
//! ├── slot.rs         - Single-slot, latest-wins delivery mailbox
//! ├── hub.rs          - Broadcast hub loop and its handle
//! ├── session.rs      - Subscriber sessions and the patch stream
//! └── subscription.rs - `GET /stream` SSE handler
//! ```
//!
//! # Delivery Model
//!
//! The hub owns the registry of sessions and is driven through a
//! [`HubHandle`]. A broadcast never waits on a subscriber: each session has
//! room for exactly one unread patch, and a newer patch replaces an unread
//! one. Slow viewers skip intermediate states but always converge on the
//! latest.
//!
//! # Example
//!
//! ```rust,no_run
//! use livecount::backend::realtime::{BroadcastHub, Patch, SubscriberSession};
//!
//! # async fn example() -> Result<(), livecount::backend::realtime::HubError> {
//! let (hub, _task) = BroadcastHub::spawn(128);
//! let mut session = SubscriberSession::new("client-id");
//! hub.register_client(&mut session).await?;
//!
//! hub.broadcast_patch(Patch::from("<main id=\"main\">1</main>")).await;
//! let patch = session.recv().await;
//! # Ok(())
//! # }
//! ```

pub mod hub;
pub mod patch;
pub mod session;
pub mod slot;
pub mod subscription;

pub use hub::{BroadcastHub, HubError, HubHandle, HubStats, Registration, SessionId};
pub use patch::{Patch, PATCH_ELEMENTS_EVENT};
pub use session::{patch_stream, SubscriberSession};
pub use subscription::handle_stream;
