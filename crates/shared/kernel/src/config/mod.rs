use crate::domain::constants::{API_BEARER_ENV, ENV_PREFIX, GITHUB_TOKEN_ENV};
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Deployment variables honored as lowest-priority defaults (config key, variable).
const LEGACY_ENV: &[(&str, &str)] =
    &[("security.api_bearer", API_BEARER_ENV), ("upstream.token", GITHUB_TOKEN_ENV)];

#[bsync_derive::bsync_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads layered configuration.
///
/// Sources, lowest priority first:
/// 1. **Deployment variables**: `API_BEARER` and `GITHUB_TOKEN`, when set.
/// 2. **Base File**: `path` (default `"server"`, any extension the `config` crate knows).
///    The file is optional so the service can run from the environment alone.
/// 3. **Environment Overrides**: variables prefixed with `BSYNC__`, nested with `__`
///    (e.g. `BSYNC__UPSTREAM__TOKEN` maps to `upstream.token`).
///
/// # Errors
/// Returns [`ConfigError::Config`] if a source is malformed or the merged values do not
/// match `T`.
///
/// # Example
/// ```rust
/// use bsync_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path = path.map_or_else(|| PathBuf::from("server"), |p| p.as_ref().to_path_buf());

    let mut builder = Config::builder();
    for (key, var) in LEGACY_ENV {
        if let Some(value) = std::env::var(var).ok().filter(|v| !v.is_empty()) {
            builder = builder.set_default(*key, value).context("Applying deployment variables")?;
        }
    }

    let builder = builder
        .add_source(File::from(effective_path.as_path()).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .convert_case(config::Case::Snake),
        );

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
