use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, Level};

use common::types::Health;
use service::{issues::IssueService, metrics};

pub mod issues;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub issues: Arc<IssueService>,
}

impl AppState {
    pub fn new(issues: Arc<IssueService>) -> Self { Self { issues } }
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn metrics_text() -> (StatusCode, String) {
    match metrics::encode_metrics() {
        Ok(text) => (StatusCode::OK, text),
        Err(e) => {
            error!(error = %e, "metrics encode failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"))
        }
    }
}

/// Build the full application router.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let ops = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_text));

    let api = Router::new().route(
        "/api/issues/:project",
        get(issues::list_issues)
            .post(issues::create_issue)
            .put(issues::update_issue)
            .delete(issues::delete_issue),
    );

    ops.merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
