use std::net::SocketAddr;
use std::path::PathBuf;

use accesslog_core::error::{AccessLogError, Result};

/// Persistence strategy selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    /// Append `name: timestamp` lines to a text file.
    File,
    /// Insert rows into a SQLite `users` table; supports lookup.
    Sqlite,
}

impl BackendMode {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendMode::File => "file",
            BackendMode::Sqlite => "sqlite",
        }
    }
}

/// Where the data files live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathProfile {
    /// Current working directory.
    Local,
    /// Mounted volume at `/data` (k8s).
    Container,
}

impl PathProfile {
    pub fn paths(self) -> StoragePaths {
        let dir = match self {
            PathProfile::Local => PathBuf::new(),
            PathProfile::Container => PathBuf::from("/data"),
        };
        StoragePaths {
            sqlite_db: dir.join("sqlite.db"),
            server_log: dir.join("server.log"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub sqlite_db: PathBuf,
    pub server_log: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: String,
    pub backend: BackendMode,
    pub storage: StoragePaths,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;

        let active = match self.backend {
            BackendMode::File => &self.storage.server_log,
            BackendMode::Sqlite => &self.storage.sqlite_db,
        };
        if active.as_os_str().is_empty() {
            return Err(AccessLogError::Config(format!(
                "{} backend path must not be empty",
                self.backend.as_str()
            )));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| AccessLogError::Config(format!("listen must be a valid SocketAddr: {e}")))
    }
}

pub fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
