use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON body returned for every failed admin request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

/// Build a `{"kind", "message"}` error response with the given status.
pub fn error_response(status: StatusCode, kind: &str, message: String) -> Response {
    // 4xx responses are already visible through TraceLayer.
    if status.is_server_error() {
        tracing::error!(error = %message, kind, "internal error");
    }
    let body = ErrorBody {
        kind: kind.to_owned(),
        message,
    };
    (status, axum::Json(body)).into_response()
}
