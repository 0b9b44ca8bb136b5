//! Operational HTTP endpoints.
//!
//! - `/hello`   : greeting page (counted as a GET)
//! - `/healthz` : liveness
//! - `/metrics` : Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;

pub async fn hello(State(state): State<AppState>) -> &'static str {
    state.metrics().get_requests.inc();
    "Hello Page\n"
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.metrics().render();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}
