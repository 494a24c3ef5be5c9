//! Session directory resolution
//!
//! The only place a session identity is interpreted. Everything downstream
//! receives a [`SessionDir`] and never looks at cookies.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use super::token::{SessionSigner, SessionToken};
use crate::filename;

/// A session's private directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDir {
    root: PathBuf,
}

impl SessionDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a top-level entry; `None` if `name` is not a plain file name
    pub fn entry(&self, name: &str) -> Option<PathBuf> {
        filename::entry_name(name).map(|name| self.root.join(name))
    }

    /// Sorted folder derived from a source PDF name
    pub fn sorted_folder(&self, pdf_name: &str) -> Option<PathBuf> {
        filename::entry_name(pdf_name)
            .map(|name| self.root.join(filename::sorted_folder_name(name)))
    }
}

/// A resolved session
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SessionToken,
    pub dir: SessionDir,
    /// True when the token was minted by this request
    pub is_new: bool,
}

/// Maps session tokens to directories under a base path
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    base: PathBuf,
    signer: SessionSigner,
    /// How long the client should keep the cookie
    cookie_max_age: Duration,
}

impl SessionStore {
    pub fn new(base: impl Into<PathBuf>, signer: SessionSigner, cookie_max_age: Duration) -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                base: base.into(),
                signer,
                cookie_max_age,
            }),
        }
    }

    pub fn cookie_max_age(&self) -> Duration {
        self.inner.cookie_max_age
    }

    /// Signed cookie value for a token
    pub fn cookie_value(&self, token: &SessionToken) -> String {
        self.inner.signer.sign(token)
    }

    /// Resolve the presented cookie value, minting a token when it is
    /// absent or fails verification.
    ///
    /// Creates the session directory if needed and stamps its mtime with
    /// the current time. Safe to call on every request.
    pub async fn resolve(&self, cookie_value: Option<&str>) -> io::Result<Session> {
        let verified = cookie_value.and_then(|value| self.inner.signer.verify(value));
        if cookie_value.is_some() && verified.is_none() {
            tracing::debug!("Discarding session cookie with a bad signature");
        }

        let (token, is_new) = match verified {
            Some(token) => (token, false),
            None => (SessionToken::generate(), true),
        };

        let root = self.inner.base.join(token.dir_name());
        tokio::fs::create_dir_all(&root).await?;

        let touch_root = root.clone();
        tokio::task::spawn_blocking(move || touch_dir(&touch_root, SystemTime::now()))
            .await
            .map_err(io::Error::other)??;

        if is_new {
            tracing::info!(session = %token, "Created session");
        }

        Ok(Session {
            token,
            dir: SessionDir::new(root),
            is_new,
        })
    }
}

/// Set a directory's mtime, the sweeper's liveness signal
fn touch_dir(dir: &Path, now: SystemTime) -> io::Result<()> {
    let handle = File::open(dir)?;
    if let Err(e) = handle.set_modified(now) {
        tracing::warn!(dir = %dir.display(), "Failed to refresh session mtime: {}", e);
    }
    Ok(())
}
