//! Shared utilities

pub mod assets;
pub mod rate_limit;
pub mod time;
