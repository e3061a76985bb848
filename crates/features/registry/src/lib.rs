//! Character registry feature slice.
//!
//! Merges character records into a YAML registry kept in a version-controlled
//! repository, committing the result and optionally opening a pull request.

#[cfg(feature = "server")]
mod api;
pub mod document;
mod error;
pub mod host;
pub mod merge;
pub mod model;
mod prompt;
mod sync;

#[cfg(feature = "server")]
pub use api::registry_router;
pub use error::{RegistryError, RegistryErrorExt};
pub use model::{Character, MergeStrategy, RepoId, SyncOp, SyncRequest, SyncResult, SyncStatus};
pub use prompt::build_prompt;
pub use sync::RegistrySync;

use crate::host::{GitHubHost, MemoryHost, RepositoryHost};
use bsync_kernel::domain::config::{ApiConfig, UpstreamProvider};
use bsync_kernel::domain::registry::InitializedSlice;
use bsync_kernel::prelude::BearerGuard;
use std::sync::Arc;

/// Registry feature state
#[bsync_derive::bsync_slice]
pub struct Registry {
    pub sync: RegistrySync,
}

/// Initialize the registry feature from the service configuration.
///
/// # Errors
/// Returns [`RegistryError::Upstream`] if the repository host client cannot be built.
pub fn init(config: &ApiConfig) -> Result<InitializedSlice, RegistryError> {
    let host: Arc<dyn RepositoryHost> = match config.upstream.provider {
        UpstreamProvider::GitHub => {
            Arc::new(GitHubHost::new(&config.upstream).context("Building repository host")?)
        }
        UpstreamProvider::Memory => {
            tracing::warn!("Registry uses the in-memory host; commits are not persisted");
            Arc::new(MemoryHost::scratch())
        }
    };
    let guard = BearerGuard::new(config.security.api_bearer.as_deref());
    if !guard.is_configured() {
        tracing::warn!("No API bearer configured; every registry request will be rejected");
    }

    tracing::info!(provider = ?config.upstream.provider, "Registry slice initialized");

    Ok(InitializedSlice::new(Registry::new(RegistryInner { sync: RegistrySync::new(host, guard) })))
}
