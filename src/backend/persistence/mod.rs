//! Persistence Module
//!
//! Durable, asynchronous logging of counter mutations.
//!
//! # Module Structure
//!
//! ```text
//! persistence/
//! ├── mod.rs     - Module exports
//! ├── db.rs      - SQLite pool, schema and the transactional event store
//! ├── queue.rs   - Bounded event queue between handlers and the writer
//! └── writer.rs  - Size/time batching writer task
//! ```
//!
//! Handlers never touch the database: they enqueue a [`MutationEvent`] and
//! return. The [`BatchWriter`] is the only consumer of the queue and the only
//! writer to the log.
//!
//! [`MutationEvent`]: crate::shared::MutationEvent

pub mod db;
pub mod queue;
pub mod writer;

pub use db::{count_events, init_schema, open_pool, recent_events, EventStore, SqliteEventStore, StoreError};
pub use queue::{EventQueue, EventReceiver, QueueClosed};
pub use writer::{BatchWriter, WriterReport};
