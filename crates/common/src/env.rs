//! Environment/runtime helpers
//!
//! Sanity checks to ensure the issue store location is usable at startup.

use std::path::Path;

use tracing::{info, warn};

/// Ensure the directory holding the store file exists, creating it if needed.
pub async fn ensure_data_dir(store_file: &Path) -> anyhow::Result<()> {
    let Some(dir) = store_file.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if tokio::fs::metadata(dir).await.is_err() {
        warn!(dir = %dir.display(), "data directory not found; creating it");
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", dir.display()))?;
    info!(store = %store_file.display(), "issue store location ready");
    Ok(())
}
