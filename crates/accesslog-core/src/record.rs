//! The single persisted entity.

use std::fmt;

use crate::timestamp;

/// One accepted submission: who, and when the server saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRecord {
    pub username: String,
    pub timestamp: String,
}

impl AccessRecord {
    pub fn new(username: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Stamp `username` with the current server-local time.
    pub fn now(username: impl Into<String>) -> Self {
        Self::new(username, timestamp::now())
    }
}

/// Line form shared by the log file and lookup responses: `username: timestamp`.
impl fmt::Display for AccessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.username, self.timestamp)
    }
}
