//! Kernel utilities shared across slices.
//! Keep this crate lightweight: configuration loading, caller authentication and,
//! behind the `server` feature, the API state plus the system endpoints.
//!
//! ## Caller authentication
//! ```rust
//! use bsync_kernel::security::{BearerGuard, bearer_token};
//!
//! let guard = BearerGuard::new(Some("s3cret"));
//! assert!(guard.verify(bearer_token("Bearer s3cret")).is_ok());
//! assert!(guard.verify(bearer_token("Bearer nope")).is_err());
//! ```
//!
//! ## Config loading (non-wasm)
//! ```rust,ignore
//! use bsync_kernel::config::load_config;
//! let cfg: bsync_kernel::domain::config::ApiConfig = load_config(Some("server"))?;
//! ```
#[cfg(not(target_arch = "wasm32"))]
pub mod config;
pub mod prelude;
pub mod security;
#[cfg(feature = "server")]
pub mod server;

pub use bsync_domain as domain;
