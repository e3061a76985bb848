mod bearer;

pub use bearer::{BearerGuard, SecurityError, SecurityErrorExt, bearer_token};
