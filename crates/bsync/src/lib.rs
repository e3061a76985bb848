//! Facade crate for Blueprint Sync features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `bsync` with the `server` feature flag.
//! - Call `bsync::init` to register feature slices; extend as new slices appear.

pub use bsync_domain as domain;
use bsync_domain::config::ApiConfig;
pub use bsync_kernel as kernel;

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        pub use bsync_kernel::server::router::system_router;
        pub use bsync_registry::registry_router;
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use bsync_registry as registry;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "server")]
        "server",
        "registry",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Initialize all enabled features.
///
/// # Errors
/// Returns an error if any feature initialization fails.
pub fn init(
    config: &ApiConfig,
) -> Result<Vec<domain::registry::InitializedSlice>, Box<dyn std::error::Error>> {
    let mut slices = Vec::new();

    // Character registry
    slices.push(features::registry::init(config)?);

    Ok(slices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_always_enabled() {
        assert!(features::is_enabled("registry"));
        assert!(!features::is_enabled("licensing"));
    }

    #[test]
    fn init_registers_every_slice() {
        let slices = init(&ApiConfig::default()).unwrap();
        assert_eq!(slices.len(), 1);
        assert!(slices[0].downcast_ref::<features::registry::Registry>().is_some());
    }
}
