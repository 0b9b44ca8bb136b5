//! Axum router wiring.
//!
//! `/user` accepts every method and decides per backend what is allowed, so
//! rejected methods get the plain "Invalid HTTP method" body.

use axum::{
    routing::{any, get},
    Router,
};

use crate::{app_state::AppState, ops, services};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/hello", get(ops::hello))
        .route("/user", any(services::user::user))
        .route("/metrics", get(ops::metrics))
        .route("/healthz", get(ops::healthz))
        .with_state(state)
}
