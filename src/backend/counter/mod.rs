//! Counter Module
//!
//! The shared counter and the HTTP handlers that read and mutate it.
//!
//! ```text
//! counter/
//! ├── mod.rs       - Module exports
//! ├── state.rs     - Counter value and bounded action history
//! └── handlers.rs  - Index page, mutation and health endpoints
//! ```

pub mod handlers;
pub mod state;

pub use handlers::{handle_decrement, handle_health, handle_increment, handle_index, handle_reset};
pub use state::{CounterSnapshot, CounterState, SharedCounter};
