use super::state::ApiState;
use axum::extract::State;
use axum::http::header;
use axum::{Json, response::IntoResponse};
use bsync_derive::{api_handler, api_model};
use bsync_domain::constants::SYSTEM_TAG;

#[api_model(rename_all = "snake_case")]
/// Health check response
pub struct HealthResponse {
    /// Always `true` while the process serves requests
    pub ok: bool,
    /// Whether the caller bearer secret is configured
    pub env_has_api_bearer: bool,
}

#[api_handler(
    get,
    path = "/api/health",
    responses((status = OK, description = "Healthcheck endpoint", body = HealthResponse)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let body = HealthResponse { ok: true, env_has_api_bearer: state.config.security.has_api_bearer() };

    (
        [
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(body),
    )
}
