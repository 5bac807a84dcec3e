//! Application state shared across handlers.

use std::sync::Arc;

use vitrina_core::repository::{Backend, FileStore};

use crate::config::AdminConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable; handlers reach the database and object storage only
/// through the core traits.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    backend: Arc<dyn Backend>,
    files: Arc<dyn FileStore>,
}

impl AppState {
    #[must_use]
    pub fn new(config: AdminConfig, backend: Arc<dyn Backend>, files: Arc<dyn FileStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                files,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Repositories (`PgBackend` in production).
    #[must_use]
    pub fn backend(&self) -> &dyn Backend {
        self.inner.backend.as_ref()
    }

    /// Object storage (`StorageClient` in production).
    #[must_use]
    pub fn files(&self) -> &dyn FileStore {
        self.inner.files.as_ref()
    }
}
