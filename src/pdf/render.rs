//! Page counting and rasterization via MuPDF
//!
//! Every call opens a fresh `mupdf::Document` and drops it before
//! returning, on success and error paths alike. MuPDF contexts are not
//! shareable across threads, so nothing here is cached.

use std::io::Cursor;
use std::path::Path;

use image::DynamicImage;
use mupdf::{Colorspace, Document, Matrix};

use super::error::{PdfError, PdfResult};

fn open_document(path: &Path) -> PdfResult<Document> {
    let path_str = path.to_string_lossy();
    Document::open(&*path_str).map_err(|e| PdfError::Open(format!("{}: {}", path.display(), e)))
}

/// Number of pages MuPDF sees in the document
pub fn page_count(path: &Path) -> PdfResult<usize> {
    let doc = open_document(path)?;
    let count = doc.page_count()?;
    Ok(count.max(0) as usize)
}

/// Render one 1-based page to PNG at the given linear zoom factor
pub fn render_page_png(path: &Path, page: usize, zoom: f32) -> PdfResult<Vec<u8>> {
    let doc = open_document(path)?;
    let count = doc.page_count()?.max(0) as usize;
    if page < 1 || page > count {
        return Err(PdfError::PageOutOfRange { page, count });
    }

    let page = doc.load_page((page - 1) as i32)?;
    let matrix = Matrix::new_scale(zoom, zoom);
    let colorspace = Colorspace::device_rgb();
    let pixmap = page
        .to_pixmap(&matrix, &colorspace, false, true)
        .map_err(|e| PdfError::Render(e.to_string()))?;

    encode_png(&pixmap)
}

/// PNG from an RGB pixmap without alpha, as `render_page_png` requests it
fn encode_png(pixmap: &mupdf::Pixmap) -> PdfResult<Vec<u8>> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    if pixmap.n() != 3 {
        return Err(PdfError::Render(format!(
            "expected 3 components per pixel, got {}",
            pixmap.n()
        )));
    }

    let img = image::RgbImage::from_raw(width, height, packed_rows(pixmap.samples(), width, height))
        .ok_or_else(|| PdfError::Render("pixmap smaller than its dimensions".to_string()))?;

    let mut output = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut output), image::ImageFormat::Png)
        .map_err(|e| PdfError::Render(e.to_string()))?;

    Ok(output)
}

/// Samples with any per-row padding removed
fn packed_rows(samples: &[u8], width: u32, height: u32) -> Vec<u8> {
    let row = width as usize * 3;
    let stride = samples.len() / (height.max(1) as usize);
    if stride <= row {
        return samples.to_vec();
    }
    samples
        .chunks_exact(stride)
        .flat_map(|line| &line[..row])
        .copied()
        .collect()
}
