use std::sync::Arc;

use crate::errors::ServiceError;
use crate::storage::KvStore;

use super::domain::Issue;

/// Reads and writes whole project collections through a [`KvStore`].
#[derive(Clone)]
pub struct ProjectRepository {
    store: Arc<dyn KvStore>,
}

impl ProjectRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self { Self { store } }

    /// Load a project's issues; unknown projects are empty.
    pub async fn load(&self, project: &str) -> Result<Vec<Issue>, ServiceError> {
        match self.store.get(project).await? {
            Some(raw) if !raw.trim().is_empty() => {
                serde_json::from_str(&raw).map_err(|e| ServiceError::corrupt(project, e))
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Overwrite a project's collection.
    pub async fn save(&self, project: &str, issues: &[Issue]) -> Result<(), ServiceError> {
        let raw = serde_json::to_string(issues).map_err(ServiceError::storage)?;
        self.store.set(project, raw).await
    }
}
