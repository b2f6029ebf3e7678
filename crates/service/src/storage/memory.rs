use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::KvStore;
use crate::errors::ServiceError;

/// In-process key-value store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryKvStore {
    inner: RwLock<HashMap<String, String>>,
}

impl MemoryKvStore {
    /// Seed the store with existing entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { inner: RwLock::new(map) }
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ServiceError> {
        Ok(self.inner.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), ServiceError> {
        self.inner.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_entries_are_visible_and_overwritable() -> Result<(), ServiceError> {
        let store = MemoryKvStore::with_entries([("testproj", "[]")]);
        assert_eq!(store.get("testproj").await?.as_deref(), Some("[]"));
        assert_eq!(store.get("missing").await?, None);

        store.set("testproj", "[{}]".into()).await?;
        assert_eq!(store.get("testproj").await?.as_deref(), Some("[{}]"));
        Ok(())
    }
}
