//! Error types for the PDF Sorter server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::filename::NameError;
use crate::pdf::PdfError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad file name, bad extension, missing field
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Destination name already taken
    #[error("{0}")]
    Conflict(String),

    /// A multi-target operation stopped halfway; the message says what
    /// was left behind
    #[error("{0}")]
    PartialFailure(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<NameError> for AppError {
    fn from(e: NameError) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::PartialFailure(msg) => {
                tracing::error!("Partial failure: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Pdf(PdfError::PageOutOfRange { page, count }) => (
                StatusCode::NOT_FOUND,
                format!("page {} not found (document has {} pages)", page, count),
            ),
            AppError::Pdf(PdfError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                (StatusCode::NOT_FOUND, "file not found".to_string())
            }
            AppError::Pdf(e) => {
                tracing::error!("PDF error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "the PDF could not be processed".to_string(),
                )
            }
            AppError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                (StatusCode::NOT_FOUND, "file not found".to_string())
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "a storage error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_message();
        let body = Json(ErrorResponse {
            success: false,
            error,
        });

        (status, body).into_response()
    }
}
