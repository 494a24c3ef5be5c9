//! Page rendering endpoints

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::session::SessionDir;
use crate::state::AppState;

#[derive(Serialize)]
pub struct PageCountResponse {
    pub pages: usize,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/page/:name/:page_num", get(render_page))
        .route("/page-count/:name", get(page_count))
}

/// PNG of one 1-based page
async fn render_page(
    State(state): State<AppState>,
    Extension(dir): Extension<SessionDir>,
    Path((name, page)): Path<(String, usize)>,
) -> Result<Response> {
    let png = state.files().page_image(&dir, &name, page).await?;
    tracing::debug!(file = %name, page, bytes = png.len(), "Rendered page");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/png")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from(png))
        .map_err(|e| AppError::Internal(format!("failed to build image response: {}", e)))
}

async fn page_count(
    State(state): State<AppState>,
    Extension(dir): Extension<SessionDir>,
    Path(name): Path<String>,
) -> Result<Json<PageCountResponse>> {
    let pages = state.files().page_count(&dir, &name).await?;
    Ok(Json(PageCountResponse { pages }))
}
