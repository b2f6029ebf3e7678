//! Storage abstractions for service layer
//!
//! Project collections live in a plain string key-value store: the key is the
//! project name and the value is the serialized issue array. Anything that can
//! `get` and `set` strings can back the service.

use async_trait::async_trait;

use crate::errors::ServiceError;

pub mod file_kv_store;
pub mod memory;

pub use file_kv_store::FileKvStore;
pub use memory::MemoryKvStore;

/// Minimal string key-value store the issue service persists into.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, ServiceError>;
    async fn set(&self, key: &str, value: String) -> Result<(), ServiceError>;
}
