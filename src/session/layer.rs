//! Session middleware
//!
//! Resolves the session before any handler runs and hands the handler a
//! [`SessionDir`] through request extensions. The signed cookie is
//! re-issued on every response so its expiry slides with activity.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

use super::store::{SessionDir, SessionStore};
use super::token::SessionToken;
use crate::error::AppError;

/// Cookie carrying the signed session token
pub const SESSION_COOKIE: &str = "pdf_session";

/// `axum::middleware::from_fn_with_state` handler
pub async fn session_layer(
    State(store): State<SessionStore>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = cookie_value(request.headers(), SESSION_COOKIE);
    let session = store.resolve(presented.as_deref()).await.map_err(|e| {
        AppError::Internal(format!("failed to prepare session directory: {}", e))
    })?;

    let set_cookie = set_cookie_header(&store, &session.token);
    let span = tracing::debug_span!("session", session = %session.token, new = session.is_new);
    request.extensions_mut().insert::<SessionDir>(session.dir);

    let mut response = next.run(request).instrument(span).await;
    match HeaderValue::from_str(&set_cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::error!("Unrepresentable session cookie: {}", e),
    }

    Ok(response)
}

fn set_cookie_header(store: &SessionStore, token: &SessionToken) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        store.cookie_value(token),
        store.cookie_max_age().as_secs()
    )
}

/// First value of the named cookie across all `Cookie` headers
pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}
