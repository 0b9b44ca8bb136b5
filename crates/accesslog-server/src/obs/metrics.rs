//! Request counters for the access-log server.
//!
//! Two unlabeled counters, one per HTTP method that can mutate or read access
//! records. Increments use relaxed atomics; handlers never coordinate.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

pub const GET_REQUESTS_TOTAL: &str = "http_requests_get_total";
pub const POST_REQUESTS_TOTAL: &str = "http_requests_post_total";

/// Monotonically increasing counter.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    /// Increment by 1.
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, name: &str, help: &str, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", name, help);
        let _ = writeln!(out, "# TYPE {} counter", name);
        let _ = writeln!(out, "{} {}", name, self.get());
    }
}

#[derive(Debug, Default)]
pub struct ServerMetrics {
    pub get_requests: Counter,
    pub post_requests: Counter,
}

impl ServerMetrics {
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.get_requests
            .render(GET_REQUESTS_TOTAL, "Number of GET requests.", &mut out);
        self.post_requests
            .render(POST_REQUESTS_TOTAL, "Number of POST requests.", &mut out);
        out
    }
}
