/// `OpenAPI` tag for service endpoints (health).
pub const SYSTEM_TAG: &str = "System";
/// `OpenAPI` tag for character registry endpoints.
pub const REGISTRY_TAG: &str = "Registry";

/// Prefix of environment overrides, e.g. `BSYNC__UPSTREAM__TOKEN`.
pub const ENV_PREFIX: &str = "BSYNC";

/// Deployment variable holding the caller bearer secret.
pub const API_BEARER_ENV: &str = "API_BEARER";
/// Deployment variable holding the upstream access token.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
