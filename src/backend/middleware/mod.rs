//! Middleware Module
//!
//! HTTP middleware for the backend server.
//!
//! - **`client_id`** - Cookie based client identification

pub mod client_id;

pub use client_id::{client_id_from_headers, client_id_middleware, ClientCookie, ClientId};
