//! HTTP mapping for `AccessLogError`.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use accesslog_core::error::{AccessLogError, ClientCode};

/// Handler error: wraps the shared error so it can become a response.
#[derive(Debug)]
pub struct HttpError(pub AccessLogError);

impl From<AccessLogError> for HttpError {
    fn from(e: AccessLogError) -> Self {
        Self(e)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status = match code {
            ClientCode::MethodNotAllowed | ClientCode::Unsupported => {
                return (
                    StatusCode::METHOD_NOT_ALLOWED,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    "Invalid HTTP method\n",
                )
                    .into_response();
            }
            ClientCode::BadRequest => StatusCode::BAD_REQUEST,
            ClientCode::Storage | ClientCode::Internal => {
                tracing::error!(error = %self.0, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "code": code.as_str(),
            "msg": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
