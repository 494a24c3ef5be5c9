//! The PDF backend seam
//!
//! File operations talk to PDFs only through [`PdfBackend`]. Calls are
//! blocking; async callers run them on the blocking pool.

use std::path::Path;

use super::error::PdfResult;
use super::{graft, render};

/// Operations the service needs from a PDF library
pub trait PdfBackend: Send + Sync + 'static {
    /// Number of pages, or an error if the library cannot open the file
    fn page_count(&self, path: &Path) -> PdfResult<usize>;

    /// Rasterize one 1-based page to PNG at a linear `zoom` factor
    fn render_page(&self, path: &Path, page: usize, zoom: f32) -> PdfResult<Vec<u8>>;

    /// Serialize a new document holding only page `page` of `source`
    fn extract_page(&self, source: &Path, page: usize) -> PdfResult<Vec<u8>>;

    /// Serialize `target` with page `page` of `source` appended, plus the
    /// resulting page count. Must not modify `target` on disk.
    fn append_page(&self, source: &Path, page: usize, target: &Path)
        -> PdfResult<(Vec<u8>, usize)>;
}

/// MuPDF for opening and rasterizing, lopdf for page tree edits
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfEngine;

impl PdfEngine {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for PdfEngine {
    fn page_count(&self, path: &Path) -> PdfResult<usize> {
        render::page_count(path)
    }

    fn render_page(&self, path: &Path, page: usize, zoom: f32) -> PdfResult<Vec<u8>> {
        render::render_page_png(path, page, zoom)
    }

    fn extract_page(&self, source: &Path, page: usize) -> PdfResult<Vec<u8>> {
        graft::extract_page(source, page)
    }

    fn append_page(
        &self,
        source: &Path,
        page: usize,
        target: &Path,
    ) -> PdfResult<(Vec<u8>, usize)> {
        graft::append_page(source, page, target)
    }
}
