use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bsync_derive::api_model;

#[api_model]
/// Error body shared by every endpoint.
pub struct ErrorResponse {
    /// Human-readable reason
    pub error: String,
}

/// Builds a JSON `{ "error": ... }` response.
pub fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: error.into() })).into_response()
}

/// Fallback for known paths hit with an unsupported method.
pub async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}
