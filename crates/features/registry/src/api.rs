use crate::Registry;
use crate::error::RegistryError;
use crate::model::{SyncRequest, SyncResult};
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bsync_derive::api_handler;
use bsync_kernel::domain::constants::REGISTRY_TAG;
use bsync_kernel::server::{ApiState, ErrorResponse, error_response};
use tracing::{error, warn};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Registry routes (`POST /api/register`).
pub fn registry_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(register_handler))
}

/// Merges one character into a registry file and commits it.
///
/// Checks run in order: credential, JSON decoding, payload validation.
#[api_handler(
    post,
    path = "/api/register",
    request_body = SyncRequest,
    responses(
        (status = OK, description = "Registry updated", body = SyncResult),
        (status = BAD_REQUEST, description = "Invalid JSON, invalid payload or unsupported strategy", body = ErrorResponse),
        (status = UNAUTHORIZED, description = "Missing or wrong bearer token", body = ErrorResponse),
        (status = METHOD_NOT_ALLOWED, description = "Any method other than POST", body = ErrorResponse),
        (status = CONFLICT, description = "Character already exists (append)", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Upstream or internal failure; the commit may have landed", body = ErrorResponse),
    ),
    tag = REGISTRY_TAG,
)]
pub(crate) async fn register_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SyncResult>, RegistryError> {
    let registry = state
        .try_get_slice::<Registry>()
        .map_err(|err| RegistryError::Internal { message: err.to_string().into(), context: None })?;

    let authorization = headers.get(header::AUTHORIZATION).and_then(|value| value.to_str().ok());
    registry.sync.authorize(authorization)?;

    let payload: serde_json::Value =
        serde_json::from_slice(&body).map_err(|_| RegistryError::invalid("Invalid JSON"))?;
    let request: SyncRequest =
        serde_json::from_value(payload).map_err(|_| RegistryError::invalid("Invalid payload"))?;

    registry.sync.sync(request).await.map(Json)
}

impl RegistryError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::InvalidPayload { .. } | Self::NotImplemented { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::UpstreamNotFound { .. }
            | Self::UpstreamWriteRejected { .. }
            | Self::Upstream { .. }
            | Self::Document { .. }
            | Self::PullRequest { .. }
            | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Registry request failed");
        } else {
            warn!(%status, error = %self, "Registry request refused");
        }

        let message = match self {
            Self::Unauthorized { .. } => "Unauthorized".to_owned(),
            Self::InvalidPayload { message, .. }
            | Self::NotImplemented { message, .. }
            | Self::Conflict { message, .. } => message.into_owned(),
            other => other.to_string(),
        };
        error_response(status, message)
    }
}
