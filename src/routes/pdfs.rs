//! Uploaded PDF endpoints
//!
//! - Index page and JSON listing
//! - Upload, delete
//! - Open inline, download as attachment

use axum::{
    body::{Body, Bytes},
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, Response},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

use super::json_body;
use crate::error::{AppError, Result};
use crate::files::PdfEntry;
use crate::html;
use crate::session::SessionDir;
use crate::state::AppState;

/// Response for the PDF listing
#[derive(Serialize)]
pub struct PdfListResponse {
    pub pdfs: Vec<PdfEntry>,
    pub total: usize,
}

/// Upload response
#[derive(Serialize)]
pub struct UploadResponse {
    pub success: bool,
    /// Name the file was stored under
    pub filename: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub delete_sorted: bool,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/pdfs", get(list_pdfs))
        .route(
            "/upload",
            post(upload_pdf).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/delete/:name", delete(delete_pdf))
        .route("/open/:name", get(open_pdf))
        .route("/download/:name", get(download_pdf))
}

async fn index(
    State(state): State<AppState>,
    Extension(dir): Extension<SessionDir>,
) -> Result<Html<String>> {
    let pdfs = state.files().list(&dir).await?;
    Ok(Html(html::index_page(&pdfs)))
}

async fn list_pdfs(
    State(state): State<AppState>,
    Extension(dir): Extension<SessionDir>,
) -> Result<Json<PdfListResponse>> {
    let pdfs = state.files().list(&dir).await?;
    let total = pdfs.len();
    Ok(Json(PdfListResponse { pdfs, total }))
}

/// Store the `file` part of a multipart body
async fn upload_pdf(
    State(state): State<AppState>,
    Extension(dir): Extension<SessionDir>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Failed to read multipart field: {}", e);
        AppError::Validation(e.body_text())
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let client_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|e| {
            tracing::warn!("Failed to read upload data: {}", e);
            AppError::Validation(e.body_text())
        })?;
        tracing::debug!(file = %client_name, bytes = data.len(), "Received upload");

        let filename = state.files().upload(&dir, &client_name, &data).await?;
        return Ok(Json(UploadResponse {
            success: true,
            filename,
        }));
    }

    tracing::warn!("No file field found in multipart upload");
    Err(AppError::Validation("no file part in the request".to_string()))
}

async fn delete_pdf(
    State(state): State<AppState>,
    Extension(dir): Extension<SessionDir>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<SuccessResponse>> {
    let request: DeleteRequest = json_body(&body)?;
    state
        .files()
        .delete(&dir, &name, request.delete_sorted)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn open_pdf(
    State(state): State<AppState>,
    Extension(dir): Extension<SessionDir>,
    Path(name): Path<String>,
) -> Result<Response> {
    let bytes = state.files().read(&dir, &name).await?;
    pdf_response(bytes, "inline", &name)
}

async fn download_pdf(
    State(state): State<AppState>,
    Extension(dir): Extension<SessionDir>,
    Path(name): Path<String>,
) -> Result<Response> {
    let bytes = state.files().read(&dir, &name).await?;
    pdf_response(bytes, "attachment", &name)
}

fn pdf_response(bytes: Vec<u8>, disposition: &str, name: &str) -> Result<Response> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_DISPOSITION, content_disposition(disposition, name))
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(format!("failed to build PDF response: {}", e)))
}

/// `<disposition>; filename="..."; filename*=UTF-8''...` with an ASCII
/// fallback name for clients that ignore the extended form
fn content_disposition(disposition: &str, name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "{}; filename=\"{}\"; filename*=UTF-8''{}",
        disposition,
        fallback,
        urlencoding::encode(name)
    )
}
