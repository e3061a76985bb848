//! # Domain Models
//!
//! Pure types shared by every Blueprint Sync crate, with `serde` as the only dependency.
//! Keep it lean: data and simple helpers only, no I/O.

pub mod config;
pub mod constants;
pub mod registry;
