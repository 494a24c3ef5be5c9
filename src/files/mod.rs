//! Session-scoped file operations
//!
//! Every operation takes the caller's [`SessionDir`] explicitly and hands
//! PDF work to a [`PdfBackend`] on the blocking pool.
//!
//! On-disk layout inside a session directory:
//!
//! ```text
//! <session>/report.pdf
//! <session>/report-sorted/page2.pdf
//! ```

mod atomic;
mod sorted;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::filename;
use crate::pdf::{PdfBackend, PdfError, PdfResult, PAGE_ZOOM};
use crate::session::SessionDir;

use atomic::{write_atomic, write_new};
pub use sorted::{CreatedPdf, NameCheck, SortedListing};

/// One uploaded PDF as shown in the listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdfEntry {
    pub name: String,
    pub pages: usize,
}

/// File operations over session directories
#[derive(Clone)]
pub struct FileStore {
    backend: Arc<dyn PdfBackend>,
}

impl FileStore {
    pub fn new(backend: Arc<dyn PdfBackend>) -> Self {
        Self { backend }
    }

    /// Run a backend call on the blocking pool, logging failures with the
    /// file they concern.
    async fn pdf_call<T, F>(&self, file: &str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn PdfBackend) -> PdfResult<T> + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        let result = tokio::task::spawn_blocking(move || f(backend.as_ref()))
            .await
            .map_err(PdfError::from)
            .and_then(|inner| inner);

        result.map_err(|e| {
            if !matches!(e, PdfError::PageOutOfRange { .. }) {
                tracing::warn!(file = %file, "PDF operation failed: {}", e);
            }
            AppError::Pdf(e)
        })
    }

    /// Uploaded PDFs with page counts, sorted by name ignoring case.
    /// Files the backend cannot open are logged and left out.
    pub async fn list(&self, dir: &SessionDir) -> Result<Vec<PdfEntry>> {
        let mut entries = tokio::fs::read_dir(dir.root()).await?;
        let mut pdfs = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !filename::has_allowed_extension(&name) {
                continue;
            }
            if !entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }

            let path = entry.path();
            match self.pdf_call(&name, move |b| b.page_count(&path)).await {
                Ok(pages) => pdfs.push(PdfEntry { name, pages }),
                Err(_) => tracing::debug!(file = %name, "Skipping PDF that cannot be opened"),
            }
        }

        pdfs.sort_by_key(|entry| entry.name.to_lowercase());
        Ok(pdfs)
    }

    /// Store an uploaded file under a cleaned, unique name and return it.
    ///
    /// A taken name gets `_1`, `_2`, ... before its extension.
    pub async fn upload(&self, dir: &SessionDir, client_name: &str, bytes: &[u8]) -> Result<String> {
        if client_name.trim().is_empty() {
            return Err(AppError::Validation("no file selected".to_string()));
        }
        if !filename::has_allowed_extension(client_name) {
            return Err(AppError::Validation("only PDF files are allowed".to_string()));
        }

        let name = filename::upload_name(client_name);
        filename::validate(&name)?;
        let (stem, ext) = filename::split_extension(&name);

        for counter in 0usize.. {
            let candidate = if counter == 0 {
                name.clone()
            } else {
                numbered_name(stem, counter, ext)
            };

            match write_new(&dir.root().join(&candidate), bytes).await {
                Ok(()) => {
                    tracing::info!(file = %candidate, bytes = bytes.len(), "Stored upload");
                    return Ok(candidate);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Internal("ran out of upload names".to_string()))
    }

    /// Delete an uploaded PDF and, if asked, its sorted folder.
    ///
    /// Not atomic across the two: if the folder cannot be removed after the
    /// file is gone, the file stays deleted and a partial failure is
    /// reported.
    pub async fn delete(&self, dir: &SessionDir, name: &str, delete_sorted: bool) -> Result<()> {
        let path = existing_entry(dir, name).await?;
        tokio::fs::remove_file(&path).await?;
        tracing::info!(file = %name, "Deleted PDF");

        if !delete_sorted {
            return Ok(());
        }

        let Some(folder) = dir.sorted_folder(name) else {
            return Ok(());
        };
        match tokio::fs::remove_dir_all(&folder).await {
            Ok(()) => {
                tracing::info!(folder = %folder.display(), "Deleted sorted folder");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                tracing::warn!(folder = %folder.display(), "Failed to delete sorted folder: {}", e);
                Err(AppError::PartialFailure(format!(
                    "'{}' was deleted but its sorted folder could not be removed",
                    name
                )))
            }
        }
    }

    /// Raw bytes of an uploaded PDF
    pub async fn read(&self, dir: &SessionDir, name: &str) -> Result<Vec<u8>> {
        let path = existing_entry(dir, name).await?;
        Ok(tokio::fs::read(&path).await?)
    }

    /// PNG of one 1-based page at the on-screen zoom
    pub async fn page_image(&self, dir: &SessionDir, name: &str, page: usize) -> Result<Vec<u8>> {
        let path = existing_entry(dir, name).await?;
        self.pdf_call(name, move |b| b.render_page(&path, page, PAGE_ZOOM))
            .await
    }

    pub async fn page_count(&self, dir: &SessionDir, name: &str) -> Result<usize> {
        let path = existing_entry(dir, name).await?;
        self.pdf_call(name, move |b| b.page_count(&path)).await
    }
}

/// `<stem>_<n><ext>`, shortening the stem so the result stays within the
/// name length limit.
fn numbered_name(stem: &str, counter: usize, ext: &str) -> String {
    let suffix = format!("_{}{}", counter, ext);
    let budget = filename::MAX_NAME_LEN.saturating_sub(suffix.chars().count());
    let stem: String = stem.chars().take(budget).collect();
    format!("{}{}", stem, suffix)
}

/// Path of an existing top-level file, or not-found
async fn existing_entry(dir: &SessionDir, name: &str) -> Result<PathBuf> {
    let not_found = || AppError::NotFound(format!("PDF '{}' not found", name));
    let path = dir.entry(name).ok_or_else(not_found)?;
    if !is_file(&path).await {
        return Err(not_found());
    }
    Ok(path)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}
