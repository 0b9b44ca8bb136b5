//! `/user`: submit a username, or (store mode) look up its access history.
//!
//! - `POST`: first `name` from the urlencoded form body, else the first from
//!   the query string; absent means an empty username is recorded.
//! - `GET`: only when the backend supports lookup, 405 otherwise. A missing
//!   or empty `name` answers 200 with an empty body and is not counted.
//!   Matching lines are buffered before the response is sent, so a storage
//!   failure mid-lookup still becomes a 500.
//! - anything else: 405 "Invalid HTTP method" in file mode, an empty 200 in
//!   store mode. Neither is counted.
//!
//! Parameters are read as raw pairs so repeated keys never reject a request.

use std::fmt::Write;

use axum::{
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use futures_util::StreamExt;

use accesslog_core::error::AccessLogError;

use crate::app_state::AppState;
use crate::error::HttpError;

/// Decoded urlencoded pairs, in the order they appeared.
pub type Pairs = Vec<(String, String)>;

/// First value of `name`, like a form lookup: later duplicates are ignored.
pub fn first_name(pairs: &[(String, String)]) -> Option<&str> {
    pairs
        .iter()
        .find(|(k, _)| k == "name")
        .map(|(_, v)| v.as_str())
}

pub async fn user(
    State(app): State<AppState>,
    method: Method,
    Query(query): Query<Pairs>,
    form: Option<Form<Pairs>>,
) -> Result<Response, HttpError> {
    let backend = app.cfg().backend.as_str();
    match method {
        Method::POST => {
            let body = form.map(|Form(pairs)| pairs).unwrap_or_default();
            let name = first_name(&body)
                .or_else(|| first_name(&query))
                .unwrap_or_default();
            submit(&app, name).await
        }
        Method::GET => {
            if !app.backend().supports_lookup() {
                tracing::debug!(backend, "lookup rejected");
                return Err(AccessLogError::LookupUnsupported(backend).into());
            }
            lookup(&app, first_name(&query).unwrap_or_default()).await
        }
        _ if app.backend().supports_lookup() => {
            tracing::debug!(%method, backend, "ignored /user method");
            Ok(StatusCode::OK.into_response())
        }
        _ => {
            tracing::debug!(%method, backend, "rejected /user method");
            Err(AccessLogError::MethodNotAllowed.into())
        }
    }
}

async fn submit(app: &AppState, name: &str) -> Result<Response, HttpError> {
    let rec = app.backend().record(name).await?;
    app.metrics().post_requests.inc();

    tracing::info!(user = %rec.username, ts = %rec.timestamp, "access recorded");
    Ok(StatusCode::OK.into_response())
}

async fn lookup(app: &AppState, name: &str) -> Result<Response, HttpError> {
    if name.is_empty() {
        return Ok(StatusCode::OK.into_response());
    }

    let mut records = app.backend().query(name).await?;
    let mut body = String::new();
    let mut matches = 0usize;
    while let Some(rec) = records.next().await {
        let rec = rec?;
        let _ = writeln!(body, "{rec}");
        matches += 1;
    }
    app.metrics().get_requests.inc();

    tracing::debug!(user = %name, matches, "lookup served");
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response())
}
