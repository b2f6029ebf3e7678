use std::{net::SocketAddr, path::Path, sync::Arc};

use axum::Router;
use configs::{AppConfig, StorageBackend, StorageConfig};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, AppState};
use service::{
    issues::IssueService,
    storage::{FileKvStore, KvStore, MemoryKvStore},
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the configured key-value backend.
pub async fn open_store(storage: &StorageConfig) -> anyhow::Result<Arc<dyn KvStore>> {
    let store: Arc<dyn KvStore> = match storage.backend {
        StorageBackend::File => {
            common::env::ensure_data_dir(Path::new(&storage.path)).await?;
            let file = FileKvStore::open(&storage.path).await?;
            info!(path = %storage.path, "using file issue store");
            file as Arc<dyn KvStore>
        }
        StorageBackend::Memory => {
            info!("using in-memory issue store; data is lost on exit");
            Arc::new(MemoryKvStore::default())
        }
    };
    Ok(store)
}

/// Assemble the router over a ready store.
pub fn build_app(store: Arc<dyn KvStore>) -> Router {
    let issues = Arc::new(IssueService::with_system_defaults(store));
    routes::build_router(AppState::new(issues), build_cors())
}

/// Public entry: build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let store = open_store(&cfg.storage).await?;
    let app = build_app(store);

    let listener = tokio::net::TcpListener::bind(cfg.server.bind_addr()).await?;
    let addr: SocketAddr = listener.local_addr()?;
    info!(%addr, "starting issue tracker");
    axum::serve(listener, app).await?;
    Ok(())
}
