use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level service configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub upstream: UpstreamConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Caller authentication.
#[derive(Default, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Shared secret expected in `Authorization: Bearer <token>`.
    /// When unset, every write request is rejected.
    pub api_bearer: Option<String>,
}

impl SecurityConfig {
    /// `true` when a non-empty bearer secret is configured.
    #[must_use]
    pub fn has_api_bearer(&self) -> bool {
        self.api_bearer.as_deref().is_some_and(|secret| !secret.is_empty())
    }
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig").field("api_bearer", &self.has_api_bearer()).finish()
    }
}

/// Which repository host backs the registry.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamProvider {
    /// GitHub REST API (or a GitHub Enterprise endpoint via `api_url`).
    #[default]
    GitHub,
    /// In-process store; branches are created on first use. For local runs only.
    Memory,
}

/// Repository host connection settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub provider: UpstreamProvider,
    pub api_url: String,
    /// Service-level access token; requests are sent unauthenticated when unset.
    pub token: Option<String>,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 4583, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            provider: UpstreamProvider::GitHub,
            api_url: "https://api.github.com".to_owned(),
            token: None,
            user_agent: "blueprint-sync".to_owned(),
            timeout_seconds: 15,
        }
    }
}
