//! File name rules
//!
//! Validation for user-typed destination names, best-effort cleanup for
//! client-supplied upload names, and the naming convention that ties a
//! source PDF to its sorted folder.

use thiserror::Error;

/// Extensions accepted for upload (lowercase, without the dot)
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf"];

/// Maximum name length in Unicode code points
pub const MAX_NAME_LEN: usize = 200;

/// Name used when nothing usable survives upload-name cleanup
pub const FALLBACK_UPLOAD_NAME: &str = "uploaded.pdf";

const SORTED_SUFFIX: &str = "-sorted";

/// Reasons a name is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name cannot be empty.")]
    Empty,

    #[error("name contains forbidden characters.")]
    ForbiddenCharacters,

    #[error("name cannot start or end with a period.")]
    LeadingOrTrailingPeriod,

    #[error("name too long (max 200).")]
    TooLong,
}

/// Control characters 0x00-0x1F and `< > : " / \ | ? *`
pub fn is_forbidden(c: char) -> bool {
    c <= '\u{1f}' || matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*')
}

/// Validate a user-typed name. The first failing rule wins.
pub fn validate(name: &str) -> Result<(), NameError> {
    if name.trim().is_empty() {
        return Err(NameError::Empty);
    }

    if name.chars().any(is_forbidden) {
        return Err(NameError::ForbiddenCharacters);
    }

    if name.starts_with('.') || name.ends_with('.') {
        return Err(NameError::LeadingOrTrailingPeriod);
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(NameError::TooLong);
    }

    Ok(())
}

/// Strip forbidden characters and surrounding whitespace
pub fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| !is_forbidden(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Clean a client-supplied upload name.
///
/// Browsers on some platforms send the full client path, so only the last
/// segment is kept. Leading periods are dropped so the result cannot be a
/// hidden file. A result that lost its allowed extension falls back to
/// [`FALLBACK_UPLOAD_NAME`]. A name longer than [`MAX_NAME_LEN`] has its
/// stem shortened so the extension survives.
pub fn upload_name(client_name: &str) -> String {
    let last_segment = client_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(client_name);

    let cleaned = sanitize(last_segment);
    let cleaned = cleaned.trim_start_matches('.').trim();

    if !has_allowed_extension(cleaned) {
        return FALLBACK_UPLOAD_NAME.to_string();
    }

    truncate_name(cleaned, MAX_NAME_LEN)
}

/// Cut the stem of `name` so the whole name fits in `max` code points
fn truncate_name(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }

    let (stem, ext) = split_extension(name);
    let keep = max.saturating_sub(ext.chars().count());
    let stem: String = stem.chars().take(keep).collect();
    format!("{}{}", stem.trim_end(), ext)
}

/// Append `.pdf` unless the name already carries it (any case)
pub fn normalize_pdf_name(name: &str) -> String {
    if name.to_lowercase().ends_with(".pdf") {
        name.to_string()
    } else {
        format!("{}.pdf", name)
    }
}

/// Whether the name's extension is in [`ALLOWED_EXTENSIONS`]
pub fn has_allowed_extension(name: &str) -> bool {
    let (_, ext) = split_extension(name);
    let ext = ext.trim_start_matches('.').to_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str())
}

/// Split off the last extension, keeping the dot on the extension.
///
/// A single leading dot does not start an extension: `.profile` has no
/// extension, `archive.tar.pdf` splits into `archive.tar` and `.pdf`.
pub fn split_extension(name: &str) -> (&str, &str) {
    let body_start = name.len() - name.trim_start_matches('.').len();
    match name[body_start..].rfind('.') {
        Some(idx) => name.split_at(body_start + idx),
        None => (name, ""),
    }
}

/// Sorted folder name for a source PDF: `<base-name>-sorted`
pub fn sorted_folder_name(pdf_name: &str) -> String {
    let (stem, _) = split_extension(pdf_name);
    format!("{}{}", stem, SORTED_SUFFIX)
}

/// Check that a URL-supplied name is a single plain path component.
///
/// Returns `None` for anything that could address a location outside the
/// directory it is joined onto.
pub fn entry_name(name: &str) -> Option<&str> {
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    if name.contains(['/', '\\', '\0']) {
        return None;
    }
    Some(name)
}
