//! Sorted folders: single-page extraction and page appends
//!
//! A source PDF's sorted folder is never recorded anywhere; it is derived
//! from the source name on every call. Renaming a source therefore
//! orphans its folder.

use serde::Serialize;

use super::{existing_entry, is_file, write_atomic, FileStore};
use crate::error::{AppError, Result};
use crate::filename;
use crate::session::SessionDir;

const NAME_TAKEN: &str = "a PDF with this name already exists";

/// Contents of a sorted folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortedListing {
    pub pdfs: Vec<String>,
    pub folder: String,
}

/// Outcome of a destination name check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameCheck {
    /// Usable; carries the normalized `.pdf` name
    Available(String),
    /// Fails validation; carries the reason
    Invalid(String),
    /// Valid but already present in the sorted folder
    Taken(String),
}

impl NameCheck {
    pub fn reason(&self) -> Option<&str> {
        match self {
            NameCheck::Available(_) => None,
            NameCheck::Invalid(reason) => Some(reason),
            NameCheck::Taken(_) => Some(NAME_TAKEN),
        }
    }
}

/// A newly written single-page PDF
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedPdf {
    /// Location relative to the session directory
    pub path: String,
    pub name: String,
    pub folder: String,
}

fn sorted_folder(dir: &SessionDir, source: &str) -> Result<std::path::PathBuf> {
    dir.sorted_folder(source)
        .ok_or_else(|| AppError::NotFound(format!("PDF '{}' not found", source)))
}

impl FileStore {
    /// PDF names in the sorted folder of `source`; empty when the folder
    /// has not been created yet.
    pub async fn list_sorted(&self, dir: &SessionDir, source: &str) -> Result<SortedListing> {
        let folder = sorted_folder(dir, source)?;
        let mut pdfs = Vec::new();

        match tokio::fs::read_dir(&folder).await {
            Ok(mut entries) => {
                while let Some(entry) = entries.next_entry().await? {
                    if let Ok(name) = entry.file_name().into_string() {
                        if filename::has_allowed_extension(&name) {
                            pdfs.push(name);
                        }
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        pdfs.sort();
        Ok(SortedListing {
            pdfs,
            folder: filename::sorted_folder_name(source),
        })
    }

    /// Validate and normalize a destination name, then check whether it is
    /// free in the sorted folder of `source`.
    pub async fn check_name(&self, dir: &SessionDir, source: &str, requested: &str) -> Result<NameCheck> {
        if let Err(e) = filename::validate(requested) {
            return Ok(NameCheck::Invalid(e.to_string()));
        }

        let name = filename::normalize_pdf_name(requested);
        let folder = sorted_folder(dir, source)?;
        if tokio::fs::try_exists(folder.join(&name)).await? {
            return Ok(NameCheck::Taken(name));
        }

        Ok(NameCheck::Available(name))
    }

    /// Write page `page` of `source` as a new one-page PDF in its sorted
    /// folder.
    ///
    /// The file appears complete or not at all. The existence check and the
    /// final rename are not one atomic step, so two concurrent creates of
    /// the same name can both succeed and the later one wins.
    pub async fn create_single_page(
        &self,
        dir: &SessionDir,
        source: &str,
        page: usize,
        requested: &str,
    ) -> Result<CreatedPdf> {
        filename::validate(requested)?;
        let name = filename::normalize_pdf_name(requested);
        let source_path = existing_entry(dir, source).await?;

        let folder = sorted_folder(dir, source)?;
        tokio::fs::create_dir_all(&folder).await?;

        let target = folder.join(&name);
        if tokio::fs::try_exists(&target).await? {
            return Err(AppError::Conflict(NAME_TAKEN.to_string()));
        }

        let bytes = self
            .pdf_call(source, move |b| b.extract_page(&source_path, page))
            .await?;
        write_atomic(&target, &bytes).await?;

        let folder_name = filename::sorted_folder_name(source);
        tracing::info!(source = %source, page, target = %name, "Created single-page PDF");

        Ok(CreatedPdf {
            path: format!("{}/{}", folder_name, name),
            name,
            folder: folder_name,
        })
    }

    /// Append page `page` of `source` to `target` in the sorted folder and
    /// return the target's new page count.
    ///
    /// The target is replaced through a temp file and a rename, so readers
    /// never see a partial file and a failure leaves it untouched. Two
    /// appends racing on one target both read the old content; the later
    /// rename wins and the other page is lost.
    pub async fn append_page(
        &self,
        dir: &SessionDir,
        source: &str,
        page: usize,
        target: &str,
    ) -> Result<usize> {
        let source_path = existing_entry(dir, source).await?;
        let folder = sorted_folder(dir, source)?;

        let target_missing = || AppError::NotFound(format!("target PDF '{}' not found", target));
        let target_path = filename::entry_name(target)
            .map(|t| folder.join(t))
            .ok_or_else(target_missing)?;
        if !is_file(&target_path).await {
            return Err(target_missing());
        }

        let read_path = target_path.clone();
        let (bytes, count) = self
            .pdf_call(source, move |b| b.append_page(&source_path, page, &read_path))
            .await?;
        write_atomic(&target_path, &bytes).await?;

        tracing::info!(source = %source, page, target = %target, pages = count, "Appended page");
        Ok(count)
    }
}
