mod health;
mod response;
pub mod router;
mod state;

pub use health::HealthResponse;
pub use response::{ErrorResponse, error_response, method_not_allowed};
pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateErrorExt, ApiStateInner};
