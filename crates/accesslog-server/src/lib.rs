//! accesslog server library entry.
//!
//! Wires config, the persistence backend, request counters, and the HTTP
//! routes. Consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod error;
pub mod obs;
pub mod ops;
pub mod router;
pub mod services;
pub mod storage;
