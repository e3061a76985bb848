pub mod api;
mod attrs;
pub mod error;
pub mod slice;
