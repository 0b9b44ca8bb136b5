//! Flat-file backend: one `username: timestamp` line per submission.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use accesslog_core::error::{AccessLogError, Result};
use accesslog_core::AccessRecord;

use crate::config::BackendMode;
use crate::storage::AccessBackend;

/// Append-only log file, opened once at startup.
#[derive(Debug)]
pub struct FileLogger {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileLogger {
    /// Open `path` for appending, creating it if absent.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        tracing::info!(path = %path.display(), "opening access log file");

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .await
            .map_err(|e| AccessLogError::Startup(format!("open {}: {e}", path.display())))?;

        tracing::info!(path = %path.display(), "access log file ready");
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }
}

#[async_trait]
impl AccessBackend for FileLogger {
    fn mode(&self) -> BackendMode {
        BackendMode::File
    }

    async fn record(&self, username: &str) -> Result<AccessRecord> {
        let rec = AccessRecord::now(username);
        let line = format!("{rec}\n");

        // single write per line keeps concurrent appends from interleaving
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(path = %self.path.display(), user = %rec.username, "access appended");
        Ok(rec)
    }
}
