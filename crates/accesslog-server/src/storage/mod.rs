//! Persistence backends.
//!
//! `/user` talks to exactly one [`AccessBackend`], chosen at startup from the
//! configured [`BackendMode`]. The file backend can only record; the SQLite
//! store can also answer lookups.

pub mod file;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use accesslog_core::error::{AccessLogError, Result};
use accesslog_core::AccessRecord;

use crate::config::{BackendMode, ServerConfig};

pub use file::FileLogger;
pub use sqlite::RecordStore;

/// Lazy, finite, single-pass sequence of lookup results.
pub type RecordStream = BoxStream<'static, Result<AccessRecord>>;

#[async_trait]
pub trait AccessBackend: Send + Sync {
    fn mode(&self) -> BackendMode;

    /// Persist `username` stamped with the current server-local time.
    async fn record(&self, username: &str) -> Result<AccessRecord>;

    fn supports_lookup(&self) -> bool {
        false
    }

    /// All records for exactly `username`, in storage order.
    async fn query(&self, _username: &str) -> Result<RecordStream> {
        Err(AccessLogError::LookupUnsupported(self.mode().as_str()))
    }
}

/// Open the backend named by `cfg`. Errors here are fatal to the process.
pub async fn open_backend(cfg: &ServerConfig) -> Result<Arc<dyn AccessBackend>> {
    match cfg.backend {
        BackendMode::File => {
            let logger = FileLogger::open(&cfg.storage.server_log).await?;
            Ok(Arc::new(logger))
        }
        BackendMode::Sqlite => {
            let store = RecordStore::new(&cfg.storage.sqlite_db);
            let ready = store
                .is_initialized()
                .await
                .map_err(|e| AccessLogError::Startup(e.to_string()))?;
            if ready {
                tracing::info!(path = %cfg.storage.sqlite_db.display(), "reusing existing users table");
            } else {
                store
                    .initialize()
                    .await
                    .map_err(|e| AccessLogError::Startup(e.to_string()))?;
            }
            Ok(Arc::new(store))
        }
    }
}
