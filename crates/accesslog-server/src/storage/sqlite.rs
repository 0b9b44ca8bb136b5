//! SQLite record store.
//!
//! Every operation opens its own connection and closes it when done; there
//! is no pool. Concurrent writers rely on SQLite's file locking.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::StreamExt;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;
use tokio::sync::mpsc;

use accesslog_core::error::{AccessLogError, Result};
use accesslog_core::AccessRecord;

use crate::config::BackendMode;
use crate::storage::{AccessBackend, RecordStream};

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE users (
    "id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
    "username" TEXT,
    "timestamp" TEXT
)
"#;

const USERS_TABLE_EXISTS: &str =
    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'users'";

const INSERT_ACCESS: &str = "INSERT INTO users (username, timestamp) VALUES (?, ?)";

const SELECT_BY_USERNAME: &str =
    "SELECT username, timestamp FROM users WHERE username = ? ORDER BY id";

/// Rows buffered between the reader task and the consumer of a lookup.
const LOOKUP_BUFFER: usize = 64;

fn storage_error(e: sqlx::Error) -> AccessLogError {
    AccessLogError::Storage(e.to_string())
}

#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    async fn connect(&self, create: bool) -> Result<SqliteConnection> {
        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(create);
        SqliteConnection::connect_with(&options)
            .await
            .map_err(storage_error)
    }

    /// Create the store file if needed and define the `users` table.
    ///
    /// Not idempotent: a second call fails because the table already exists.
    pub async fn initialize(&self) -> Result<()> {
        tracing::info!(path = %self.path.display(), "creating users table");

        let mut conn = self.connect(true).await?;
        let created = sqlx::query(CREATE_USERS_TABLE)
            .execute(&mut conn)
            .await
            .map_err(storage_error);
        conn.close().await.map_err(storage_error)?;
        created?;

        tracing::info!(path = %self.path.display(), "users table created");
        Ok(())
    }

    /// True when the store file exists and already defines `users`.
    pub async fn is_initialized(&self) -> Result<bool> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(false);
        }

        let mut conn = self.connect(false).await?;
        let count: i64 = sqlx::query_scalar(USERS_TABLE_EXISTS)
            .fetch_one(&mut conn)
            .await
            .map_err(storage_error)?;
        conn.close().await.map_err(storage_error)?;
        Ok(count > 0)
    }
}

#[async_trait]
impl AccessBackend for RecordStore {
    fn mode(&self) -> BackendMode {
        BackendMode::Sqlite
    }

    async fn record(&self, username: &str) -> Result<AccessRecord> {
        let rec = AccessRecord::now(username);

        let mut conn = self.connect(false).await?;
        let inserted = sqlx::query(INSERT_ACCESS)
            .bind(&rec.username)
            .bind(&rec.timestamp)
            .execute(&mut conn)
            .await
            .map_err(storage_error);
        conn.close().await.map_err(storage_error)?;
        inserted?;

        tracing::debug!(user = %rec.username, ts = %rec.timestamp, "access inserted");
        Ok(rec)
    }

    fn supports_lookup(&self) -> bool {
        true
    }

    async fn query(&self, username: &str) -> Result<RecordStream> {
        if username.is_empty() {
            return Ok(futures_util::stream::empty().boxed());
        }

        let mut conn = self.connect(false).await?;
        let username = username.to_owned();
        let (tx, rx) = mpsc::channel(LOOKUP_BUFFER);

        // The reader owns the connection; dropping the stream stops it early.
        tokio::spawn(async move {
            {
                let mut rows = sqlx::query_as::<_, (String, String)>(SELECT_BY_USERNAME)
                    .bind(username)
                    .fetch(&mut conn);

                while let Some(row) = rows.next().await {
                    let item = row
                        .map(|(user, ts)| AccessRecord::new(user, ts))
                        .map_err(storage_error);
                    let failed = item.is_err();
                    if tx.send(item).await.is_err() || failed {
                        break;
                    }
                }
            }
            if let Err(e) = conn.close().await {
                tracing::warn!(error = %e, "closing lookup connection failed");
            }
        });

        let stream = futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(stream.boxed())
    }
}
