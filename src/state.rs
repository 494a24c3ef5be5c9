//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::files::FileStore;
use crate::pdf::{PdfBackend, PdfEngine};
use crate::session::{SessionSigner, SessionStore};
use crate::sweeper::RetentionSweeper;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    sessions: SessionStore,
    files: FileStore,
}

impl AppState {
    /// State backed by the MuPDF/lopdf engine
    pub fn new(config: Config) -> Self {
        Self::with_backend(config, Arc::new(PdfEngine::new()))
    }

    pub fn with_backend(config: Config, backend: Arc<dyn PdfBackend>) -> Self {
        let sessions = SessionStore::new(
            config.storage.base_dir.clone(),
            SessionSigner::new(&config.session.secret),
            config.session.retention,
        );

        Self {
            inner: Arc::new(AppStateInner {
                sessions,
                files: FileStore::new(backend),
                config,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the session store
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    /// Get the file store
    pub fn files(&self) -> &FileStore {
        &self.inner.files
    }

    /// Sweeper for the configured storage base
    pub fn sweeper(&self) -> RetentionSweeper {
        let config = self.config();
        RetentionSweeper::new(
            config.storage.base_dir.clone(),
            config.session.retention,
            config.session.sweep_interval,
        )
    }
}
