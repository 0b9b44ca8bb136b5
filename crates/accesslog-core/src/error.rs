//! Shared error type across accesslog crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed value.
    BadRequest,
    /// Wrong HTTP method for the endpoint.
    MethodNotAllowed,
    /// Operation not offered by the active backend.
    Unsupported,
    /// Storage engine or file write failure.
    Storage,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ClientCode::Unsupported => "UNSUPPORTED",
            ClientCode::Storage => "STORAGE",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, AccessLogError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum AccessLogError {
    /// Log file or store file could not be prepared at boot.
    #[error("startup failed: {0}")]
    Startup(String),
    #[error("invalid config: {0}")]
    Config(String),
    /// Any connect/prepare/exec/query failure of the record store.
    #[error("storage error: {0}")]
    Storage(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid http method")]
    MethodNotAllowed,
    #[error("lookup not supported by {0} backend")]
    LookupUnsupported(&'static str),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl AccessLogError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            AccessLogError::BadRequest(_) => ClientCode::BadRequest,
            AccessLogError::MethodNotAllowed => ClientCode::MethodNotAllowed,
            AccessLogError::LookupUnsupported(_) => ClientCode::Unsupported,
            AccessLogError::Storage(_) | AccessLogError::Io(_) => ClientCode::Storage,
            AccessLogError::Startup(_)
            | AccessLogError::Config(_)
            | AccessLogError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Whether the error should abort the process instead of a single request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AccessLogError::Startup(_) | AccessLogError::Config(_))
    }
}
