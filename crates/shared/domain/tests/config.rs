use bsync_domain::config::{ApiConfig, SecurityConfig, ServerConfig, UpstreamConfig, UpstreamProvider};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 4583);
    assert!(server.ssl.is_none());

    let upstream = UpstreamConfig::default();
    assert_eq!(upstream.provider, UpstreamProvider::GitHub);
    assert_eq!(upstream.api_url, "https://api.github.com");
    assert_eq!(upstream.timeout_seconds, 15);
    assert!(upstream.token.is_none());

    assert!(!SecurityConfig::default().has_api_bearer());
}

#[test]
fn api_config_deserializes() {
    let raw = json!({
        "server": { "address": "::", "port": 8080 },
        "security": { "api_bearer": "s3cret" },
        "upstream": { "provider": "memory", "token": "ghp_x", "timeout_seconds": 5 }
    });

    let cfg: ApiConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 8080);
    assert!(cfg.security.has_api_bearer());
    assert_eq!(cfg.upstream.provider, UpstreamProvider::Memory);
    assert_eq!(cfg.upstream.token.as_deref(), Some("ghp_x"));
    assert_eq!(cfg.upstream.user_agent, "blueprint-sync");
}

#[test]
fn empty_bearer_counts_as_unset() {
    let cfg: ApiConfig =
        serde_json::from_value(json!({ "security": { "api_bearer": "" } })).expect("deserialize");
    assert!(!cfg.security.has_api_bearer());
}

#[test]
fn debug_output_redacts_secrets() {
    let mut cfg = ApiConfig::default();
    cfg.security.api_bearer = Some("s3cret".to_owned());
    cfg.upstream.token = Some("ghp_token".to_owned());

    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("s3cret"));
    assert!(!rendered.contains("ghp_token"));
}
