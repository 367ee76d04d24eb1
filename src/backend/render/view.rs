/**
 * HTML Views
 *
 * Server-rendered markup for the counter page. `render_main` produces the
 * `<main id="main">` fragment that is pushed to every viewer as a patch;
 * `render_index` wraps the same fragment in the full page served on `GET /`.
 *
 * One rendered fragment is shared by all viewers, so it carries nothing
 * viewer-specific. The client that caused the render is recorded in the
 * `data-origin` attribute; the viewer's own id is shown in the page header,
 * outside the patched element.
 *
 * The page loads the Datastar client, which opens `GET /stream` on load and
 * morphs each incoming fragment into the element with the matching id.
 * Every interpolated value is HTML-escaped.
 */
use std::fmt::Write;
use thiserror::Error;

use crate::backend::counter::state::CounterSnapshot;
use crate::backend::realtime::patch::Patch;

/// Datastar client bundle loaded by the index page
pub const DATASTAR_SCRIPT_URL: &str =
    "https://cdn.jsdelivr.net/gh/starfederation/datastar@1.0.0-RC.5/bundles/datastar.js";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write markup: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Escape text for use in element content and quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn write_main(out: &mut String, origin: &str, snapshot: &CounterSnapshot) -> Result<(), RenderError> {
    writeln!(out, r#"<main id="main" data-origin="{}">"#, escape_html(origin))?;
    writeln!(out, r#"  <div class="counter">"#)?;
    writeln!(out, r#"    <button data-on-click="@post('/decrement')">-</button>"#)?;
    writeln!(out, r#"    <span id="count">{}</span>"#, snapshot.value)?;
    writeln!(out, r#"    <button data-on-click="@post('/increment')">+</button>"#)?;
    writeln!(out, r#"    <button data-on-click="@post('/reset')">Reset</button>"#)?;
    writeln!(out, r#"  </div>"#)?;

    if snapshot.recent_actions.is_empty() {
        writeln!(out, r#"  <p class="history-empty">No actions yet</p>"#)?;
    } else {
        writeln!(out, r#"  <ol class="history">"#)?;
        // Newest first.
        for record in snapshot.recent_actions.iter().rev() {
            writeln!(
                out,
                r#"    <li><code>{}</code> {}</li>"#,
                escape_html(&record.client_id),
                record.action
            )?;
        }
        writeln!(out, r#"  </ol>"#)?;
    }

    write!(out, "</main>")?;
    Ok(())
}

/// Render the live fragment on behalf of `client_id`
pub fn render_main(client_id: &str, snapshot: &CounterSnapshot) -> Result<Patch, RenderError> {
    let mut out = String::with_capacity(512 + snapshot.recent_actions.len() * 64);
    write_main(&mut out, client_id, snapshot)?;
    Ok(Patch::from(out))
}

/// Render the full page served on `GET /`
pub fn render_index(client_id: &str, snapshot: &CounterSnapshot) -> Result<String, RenderError> {
    let mut out = String::with_capacity(1024 + snapshot.recent_actions.len() * 64);
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, r#"<html lang="en">"#)?;
    writeln!(out, "<head>")?;
    writeln!(out, r#"  <meta charset="utf-8">"#)?;
    writeln!(out, r#"  <meta name="viewport" content="width=device-width, initial-scale=1">"#)?;
    writeln!(out, "  <title>livecount</title>")?;
    writeln!(out, r#"  <script type="module" src="{}"></script>"#, DATASTAR_SCRIPT_URL)?;
    writeln!(out, "</head>")?;
    writeln!(out, r#"<body data-on-load="@get('/stream')">"#)?;
    writeln!(
        out,
        r#"<header class="whoami">You are <code>{}</code></header>"#,
        escape_html(client_id)
    )?;
    write_main(&mut out, client_id, snapshot)?;
    writeln!(out)?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")?;
    Ok(out)
}
