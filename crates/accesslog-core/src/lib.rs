//! accesslog core: the access record, its timestamp format, and the error
//! surface shared by the server.
//!
//! This crate carries no transport, storage, or runtime dependencies so the
//! record format can be reused by tooling that reads `server.log` files.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod record;
pub mod timestamp;

/// Shared result type.
pub use error::{AccessLogError, ClientCode, Result};
pub use record::AccessRecord;
