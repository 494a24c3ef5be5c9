//! Write helpers that never leave a half-written file at the destination

use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Replace (or create) `target` with `bytes` via a sibling temp file and a
/// rename. Readers see either the old content or the new, never a mix. On
/// failure the temp file is removed and `target` is left as it was.
pub async fn write_atomic(target: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = temp_path(target);

    let result = async {
        write_file(&tmp, bytes, true).await?;
        tokio::fs::rename(&tmp, target).await
    }
    .await;

    if result.is_err() {
        remove_quietly(&tmp).await;
    }
    result
}

/// Create `path` with `bytes`, failing with `AlreadyExists` if it is
/// taken. A partially written file is removed before returning an error.
pub async fn write_new(path: &Path, bytes: &[u8]) -> io::Result<()> {
    match write_file(path, bytes, false).await {
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(e),
        Err(e) => {
            remove_quietly(path).await;
            Err(e)
        }
        ok => ok,
    }
}

async fn write_file(path: &Path, bytes: &[u8], sync: bool) -> io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    if sync {
        file.sync_all().await?;
    } else {
        file.flush().await?;
    }
    Ok(())
}

/// `<name>.<random>.tmp` next to the target
fn temp_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!("{}.{}.tmp", name, Uuid::new_v4().simple()))
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), "Failed to remove temporary file: {}", e);
        }
    }
}
