//! Shared application state for the access-log server.
//!
//! One `AppState` is built at startup and cloned into every handler. It owns
//! the config, the single persistence backend, and the request counters.

use std::sync::Arc;

use accesslog_core::error::Result;

use crate::config::ServerConfig;
use crate::obs::metrics::ServerMetrics;
use crate::storage::{self, AccessBackend};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServerConfig,
    backend: Arc<dyn AccessBackend>,
    metrics: ServerMetrics,
}

impl AppState {
    /// Build application state, opening the configured backend.
    /// Returns Result so main can exit cleanly on startup errors.
    pub async fn new(cfg: ServerConfig) -> Result<Self> {
        let backend = storage::open_backend(&cfg).await?;
        Ok(Self::with_backend(cfg, backend))
    }

    pub fn with_backend(cfg: ServerConfig, backend: Arc<dyn AccessBackend>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                backend,
                metrics: ServerMetrics::default(),
            }),
        }
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn backend(&self) -> &dyn AccessBackend {
        self.inner.backend.as_ref()
    }

    pub fn metrics(&self) -> &ServerMetrics {
        &self.inner.metrics
    }
}
