//! Lightweight in-process metrics (dependency-free).
//!
//! Request counters are stored as atomics and rendered in Prometheus text
//! exposition format by the `/metrics` handler.

pub mod metrics;
