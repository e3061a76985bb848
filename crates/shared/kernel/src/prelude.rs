pub use crate::domain::config::ApiConfig;
pub use crate::security::{BearerGuard, SecurityError, bearer_token};
#[cfg(feature = "server")]
pub use crate::server::{ApiState, ErrorResponse};
