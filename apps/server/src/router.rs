use axum::Router;
use bsync::kernel::server::{ApiState, method_not_allowed};
use bsync::server::router::{registry_router, system_router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(
    info(title = "Blueprint Sync", description = "Character registry sync service"),
    tags(
        (name = "Registry", description = "Character registry merge and commit"),
        (name = "System", description = "Service health"),
    )
)]
struct ApiDoc;

pub(crate) fn init(state: ApiState) -> Router {
    let api = ApiDoc::openapi();

    // Separate the OpenAPI routes and the API documentation object
    let (openapi_routes, api_doc) = OpenApiRouter::with_openapi(api)
        .merge(system_router())
        .merge(registry_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .split_for_parts();

    // Create the Scalar UI routes
    let scalar_routes = Scalar::with_url("/api", api_doc);

    // Known paths answer unsupported methods with a JSON 405
    Router::new()
        .merge(openapi_routes)
        .merge(scalar_routes)
        .method_not_allowed_fallback(method_not_allowed)
}
