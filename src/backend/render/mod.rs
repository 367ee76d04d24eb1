//! Rendering Module
//!
//! HTML for the index page and the live `<main>` fragment pushed to viewers.

pub mod view;

pub use view::{escape_html, render_index, render_main, RenderError};
