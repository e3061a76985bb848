#![cfg(feature = "server")]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use bsync_kernel::domain::config::ApiConfig;
use bsync_kernel::domain::registry::InitializedSlice;
use bsync_kernel::prelude::BearerGuard;
use bsync_kernel::server::{ApiState, method_not_allowed};
use bsync_registry::host::{HostCall, MemoryHost};
use bsync_registry::{Registry, RegistryInner, RegistrySync, registry_router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "s3cret";

fn app(host: &MemoryHost) -> Router {
    let sync = RegistrySync::new(Arc::new(host.clone()), BearerGuard::new(Some(SECRET)));
    let state = ApiState::builder()
        .config(ApiConfig::default())
        .register_slice(InitializedSlice::new(Registry::new(RegistryInner { sync })))
        .build()
        .expect("state");

    let (router, _) = registry_router().with_state(state).split_for_parts();
    router.method_not_allowed_fallback(method_not_allowed)
}

fn register(token: &str, body: impl Into<Body>) -> Request<Body> {
    Request::post("/api/register")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .expect("request")
}

fn luna_payload() -> Value {
    json!({
        "op": "append_character",
        "repo": "org/repo",
        "branch": "main",
        "path": "characters.yaml",
        "character": { "name": "LUNA", "face_blueprint": { "eyes": "blue" } }
    })
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

#[tokio::test]
async fn luna_is_registered_once() {
    let host = MemoryHost::new();
    host.put_file("main", "characters.yaml", "");

    let (status, body) = call(app(&host), register(SECRET, luna_payload().to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "status": "ok", "commitUrl": "memory://org/repo/blob/main/characters.yaml" })
    );

    let (status, body) = call(app(&host), register(SECRET, luna_payload().to_string())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({ "error": "Character LUNA already exists" }));
}

#[tokio::test]
async fn credential_is_checked_before_the_body() {
    let host = MemoryHost::new().with_branch("main");

    let (status, body) = call(app(&host), register("wrong", "{not json")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn bad_bodies_map_to_bad_request() {
    let host = MemoryHost::new().with_branch("main");
    let mut lowercase = luna_payload();
    lowercase["character"]["name"] = json!("Luna");
    let mut per_file = luna_payload();
    per_file["merge_strategy"] = json!("per-file");

    let cases = [
        ("{not json".to_owned(), "Invalid JSON"),
        (json!({ "repo": 5 }).to_string(), "Invalid payload"),
        (json!({ "repo": "org/repo" }).to_string(), "Invalid payload"),
        (lowercase.to_string(), "name must be UPPERCASE & unique"),
        (per_file.to_string(), "per-file strategy not implemented"),
    ];
    for (payload, expected) in cases {
        let (status, body) = call(app(&host), register(SECRET, payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{expected}");
        assert_eq!(body, json!({ "error": expected }));
    }
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn other_methods_are_not_allowed() {
    let request = Request::get("/api/register").body(Body::empty()).expect("request");

    let (status, body) = call(app(&MemoryHost::new()), request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({ "error": "Method Not Allowed" }));
}

#[tokio::test]
async fn upstream_failures_are_internal_errors() {
    let host = MemoryHost::new();

    let (status, body) = call(app(&host), register(SECRET, luna_payload().to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("main")), "{body}");
    assert_eq!(host.calls(), vec![HostCall::ResolveBranch { branch: "main".to_owned() }]);
}

#[tokio::test]
async fn pull_request_link_is_returned() {
    let host = MemoryHost::new();
    host.put_file("main", "characters.yaml", "characters: []\n");
    let mut payload = luna_payload();
    payload["create_pr"] = json!(true);

    let (status, body) = call(app(&host), register(SECRET, payload.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prUrl"], json!("memory://org/repo/pull/1"));
}
