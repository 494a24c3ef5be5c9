//! PDF backend
//!
//! Wraps the external PDF libraries behind a small blocking interface:
//! page counting and PNG rendering through MuPDF, single-page extraction
//! and page appends through lopdf.

mod backend;
mod error;
mod graft;
mod render;

#[cfg(test)]
pub(crate) mod fixtures;

pub use backend::{PdfBackend, PdfEngine};
pub use error::{PdfError, PdfResult};

/// Linear zoom used for on-screen page images (4x the pixel area)
pub const PAGE_ZOOM: f32 = 2.0;
