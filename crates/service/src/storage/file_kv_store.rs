use std::{collections::HashMap, path::PathBuf, sync::Arc};
use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::debug;

use crate::errors::ServiceError;
use super::KvStore;

/// JSON file-backed string key-value store.
///
/// Holds a `HashMap<String, String>` in memory and rewrites the whole file on
/// every `set`. Each value is an opaque string (for issues: a serialized
/// project collection).
#[derive(Clone)]
pub struct FileKvStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
    file_path: PathBuf,
}

impl FileKvStore {
    /// Open the store at `path`. Creates the file with an empty map if missing;
    /// an unreadable or malformed file is an error rather than being reset.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(ServiceError::storage)?;
        }

        let map: HashMap<String, String> = match fs::read(&file_path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ServiceError::corrupt(&file_path.display().to_string(), e))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty: HashMap<String, String> = HashMap::new();
                fs::write(&file_path, serde_json::to_vec(&empty).map_err(ServiceError::storage)?)
                    .await
                    .map_err(ServiceError::storage)?;
                empty
            }
            Err(e) => return Err(ServiceError::storage(e)),
        };
        debug!(path = %file_path.display(), keys = map.len(), "file kv store opened");

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(map)), file_path }))
    }

    /// Write the whole map to a sibling temp file, then rename it over the
    /// store file. Callers hold the write guard so saves never overlap.
    async fn save(&self, map: &HashMap<String, String>) -> Result<(), ServiceError> {
        let data = serde_json::to_vec(map).map_err(ServiceError::storage)?;
        let mut tmp = self.file_path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, data).await.map_err(ServiceError::storage)?;
        fs::rename(&tmp, &self.file_path).await.map_err(ServiceError::storage)?;
        Ok(())
    }

    #[cfg(test)]
    async fn keys(&self) -> Vec<String> {
        let map = self.inner.read().await;
        map.keys().cloned().collect()
    }
}

#[async_trait]
impl KvStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        map.insert(key.to_string(), value);
        self.save(&map).await
    }
}
