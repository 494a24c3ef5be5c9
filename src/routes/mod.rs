//! Route modules for PDF Sorter
//!
//! Everything except `/health` runs behind the session layer and receives
//! the caller's [`SessionDir`](crate::session::SessionDir) as an extension.

pub mod health;
pub mod pages;
pub mod pdfs;
pub mod sorter;

use axum::{body::Bytes, middleware, Router};
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;

use crate::error::{AppError, Result};
use crate::session::session_layer;
use crate::state::AppState;

/// The complete application router
pub fn app(state: AppState) -> Router {
    let session = middleware::from_fn_with_state(state.sessions().clone(), session_layer);
    let max_upload = state.config().server.max_upload_bytes;

    Router::new()
        .merge(pdfs::router(max_upload))
        .merge(pages::router())
        .merge(sorter::router())
        .route_layer(session)
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Parse an optional JSON request body; an empty body is the default value
fn json_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::Validation(format!("invalid JSON body: {}", e)))
}
