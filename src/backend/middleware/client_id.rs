/**
 * Client Identification Middleware
 *
 * Every browser is identified by an opaque id kept in a cookie (by default
 * `datastar-client-id`). The middleware reads the cookie, or mints a fresh
 * 32 character hex id when it is missing or malformed, attaches the id to
 * the request extensions as [`ClientId`], and sets the cookie on the
 * response when it had to mint one.
 *
 * There is no authentication: the id only labels actions in the history
 * and the event log.
 */
use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue, StatusCode,
    },
    middleware::Next,
    response::Response,
};
use std::time::Duration;
use uuid::Uuid;

use crate::backend::server::state::AppState;
use crate::shared::config::{DEFAULT_COOKIE_MAX_AGE, DEFAULT_COOKIE_NAME};

const MAX_CLIENT_ID_LEN: usize = 128;

/// Identity of the browser issuing the request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientId(pub String);

impl ClientId {
    /// Mint a new random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cookie settings used by the middleware
#[derive(Clone, Debug)]
pub struct ClientCookie {
    pub name: String,
    pub max_age: Duration,
}

impl Default for ClientCookie {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            max_age: DEFAULT_COOKIE_MAX_AGE,
        }
    }
}

impl FromRef<AppState> for ClientCookie {
    fn from_ref(app_state: &AppState) -> Self {
        Self {
            name: app_state.config.cookie_name.clone(),
            max_age: app_state.config.cookie_max_age,
        }
    }
}

impl ClientCookie {
    /// `Set-Cookie` value assigning `id`
    pub fn header_value(&self, id: &ClientId) -> Option<HeaderValue> {
        let cookie = format!(
            "{}={}; Path=/; Max-Age={}; SameSite=Lax",
            self.name,
            id,
            self.max_age.as_secs()
        );
        HeaderValue::from_str(&cookie).ok()
    }
}

fn is_valid_client_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_CLIENT_ID_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Find a usable client id in the request's `Cookie` headers
pub fn client_id_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<ClientId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && is_valid_client_id(value))
        .map(|(_, value)| ClientId(value.to_string()))
}

/// Client identification middleware
///
/// Apply with `axum::middleware::from_fn_with_state`.
pub async fn client_id_middleware(
    State(cookie): State<ClientCookie>,
    mut request: Request,
    next: Next,
) -> Response {
    let (client_id, minted) = match client_id_from_headers(request.headers(), &cookie.name) {
        Some(id) => (id, false),
        None => {
            let id = ClientId::generate();
            tracing::debug!("[Client] Assigned new client id {}", id);
            (id, true)
        }
    };

    request.extensions_mut().insert(client_id.clone());
    let mut response = next.run(request).await;

    if minted {
        match cookie.header_value(&client_id) {
            Some(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            None => tracing::warn!("[Client] Could not encode cookie '{}'", cookie.name),
        }
    }

    response
}

impl<S> FromRequestParts<S> for ClientId
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<ClientId>().cloned().ok_or_else(|| {
            tracing::error!("[Client] ClientId missing, is the middleware installed?");
            StatusCode::INTERNAL_SERVER_ERROR
        })
    }
}
