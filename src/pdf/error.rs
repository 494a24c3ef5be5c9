//! PDF backend error types

use thiserror::Error;

/// Errors raised by the PDF backend
#[derive(Debug, Error)]
pub enum PdfError {
    /// The library could not open or parse the document
    #[error("Failed to open PDF: {0}")]
    Open(String),

    /// Requested page is outside `[1, count]`
    #[error("Page {page} not found (document has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },

    /// Rasterization or image encoding failed
    #[error("Failed to render page: {0}")]
    Render(String),

    /// Page copy or document serialization failed
    #[error("Failed to edit PDF: {0}")]
    Edit(String),

    /// The document is structurally unusable (no page tree, bad references)
    #[error("Malformed PDF: {0}")]
    Malformed(String),

    /// MuPDF error
    #[error("MuPDF error: {0}")]
    MuPdf(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking task running the operation panicked or was cancelled
    #[error("PDF task failed: {0}")]
    Task(String),
}

/// Result type alias for PDF backend operations
pub type PdfResult<T> = std::result::Result<T, PdfError>;

impl From<mupdf::Error> for PdfError {
    fn from(e: mupdf::Error) -> Self {
        PdfError::MuPdf(e.to_string())
    }
}

impl From<lopdf::Error> for PdfError {
    fn from(e: lopdf::Error) -> Self {
        PdfError::Edit(e.to_string())
    }
}

impl From<tokio::task::JoinError> for PdfError {
    fn from(e: tokio::task::JoinError) -> Self {
        PdfError::Task(e.to_string())
    }
}
