//! Service layer for the issue tracker.
//! - Owns the issue domain and its query/update rules.
//! - Persists project collections through a pluggable key-value store.
//! - Independent of the HTTP framework.

pub mod errors;
pub mod issues;
pub mod metrics;
pub mod storage;
