//! Shared helpers for the issue tracker crates: logging setup, runtime
//! directory checks and small wire types.

pub mod types;
pub mod utils;
pub mod env;
