//! Page sorter endpoints
//!
//! The sorter view plus the JSON calls it makes: listing the sorted folder,
//! checking a destination name, creating a single-page PDF and appending a
//! page to one.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::Html,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

use super::json_body;
use crate::error::{AppError, Result};
use crate::files::{CreatedPdf, NameCheck, SortedListing};
use crate::html;
use crate::session::SessionDir;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SorterQuery {
    /// Kept as text so a malformed value falls back to page 1
    pub start: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckNameRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum CheckNameResponse {
    Valid { valid: bool, name: String },
    Invalid { valid: bool, error: String },
}

#[derive(Debug, Default, Deserialize)]
pub struct CreatePdfRequest {
    pub page: Option<usize>,
    #[serde(default)]
    pub name: String,
}

#[derive(Serialize)]
pub struct CreatePdfResponse {
    pub success: bool,
    #[serde(flatten)]
    pub created: CreatedPdf,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppendRequest {
    pub page: Option<usize>,
    pub target: Option<String>,
}

#[derive(Serialize)]
pub struct AppendResponse {
    pub success: bool,
    pub target: String,
    pub new_page_count: usize,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sorter/:name", get(sorter_view))
        .route("/list-sorted/:name", get(list_sorted))
        .route("/check-name/:name", post(check_name))
        .route("/create-pdf/:name", post(create_pdf))
        .route("/append-to-pdf/:name", post(append_to_pdf))
}

async fn sorter_view(
    State(state): State<AppState>,
    Extension(dir): Extension<SessionDir>,
    Path(name): Path<String>,
    Query(query): Query<SorterQuery>,
) -> Result<Html<String>> {
    let total = state.files().page_count(&dir, &name).await?;
    let start = clamp_start(query.start.as_deref(), total);
    Ok(Html(html::sorter_page(&name, start, total)))
}

/// Requested start page limited to `[1, total]`; page 1 when absent or
/// not a number
fn clamp_start(raw: Option<&str>, total: usize) -> usize {
    let requested = raw
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(1);
    let last = total.max(1) as i64;
    requested.clamp(1, last) as usize
}

async fn list_sorted(
    State(state): State<AppState>,
    Extension(dir): Extension<SessionDir>,
    Path(name): Path<String>,
) -> Result<Json<SortedListing>> {
    Ok(Json(state.files().list_sorted(&dir, &name).await?))
}

/// Always answers 200; an unusable name is reported in the body
async fn check_name(
    State(state): State<AppState>,
    Extension(dir): Extension<SessionDir>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<CheckNameResponse>> {
    let request: CheckNameRequest = match json_body(&body) {
        Ok(request) => request,
        Err(e) => {
            return Ok(Json(CheckNameResponse::Invalid {
                valid: false,
                error: e.to_string(),
            }))
        }
    };

    let check = state.files().check_name(&dir, &name, &request.name).await?;
    let response = match check {
        NameCheck::Available(name) => CheckNameResponse::Valid { valid: true, name },
        other => CheckNameResponse::Invalid {
            valid: false,
            error: other.reason().unwrap_or_default().to_string(),
        },
    };

    Ok(Json(response))
}

async fn create_pdf(
    State(state): State<AppState>,
    Extension(dir): Extension<SessionDir>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<CreatePdfResponse>> {
    let request: CreatePdfRequest = json_body(&body)?;
    let page = request
        .page
        .ok_or_else(|| AppError::Validation("page is required".to_string()))?;

    let created = state
        .files()
        .create_single_page(&dir, &name, page, &request.name)
        .await?;

    Ok(Json(CreatePdfResponse {
        success: true,
        created,
    }))
}

async fn append_to_pdf(
    State(state): State<AppState>,
    Extension(dir): Extension<SessionDir>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<AppendResponse>> {
    let request: AppendRequest = json_body(&body)?;
    let page = request
        .page
        .ok_or_else(|| AppError::Validation("page is required".to_string()))?;
    let target = request
        .target
        .ok_or_else(|| AppError::Validation("target is required".to_string()))?;

    let new_page_count = state
        .files()
        .append_page(&dir, &name, page, &target)
        .await?;

    Ok(Json(AppendResponse {
        success: true,
        target,
        new_page_count,
    }))
}
