//! Access-record endpoints.

pub mod user;
