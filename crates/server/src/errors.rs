use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use service::issues::IssueError;

/// Error body: `{"error": ..., "_id": ...}`, `_id` only when one is in play.
#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Handler error wrapping the issue service outcome.
///
/// Domain rejections are answered inline with `200 OK`; infrastructure
/// faults become `500`.
#[derive(Debug)]
pub struct ApiError(pub IssueError);

impl From<IssueError> for ApiError {
    fn from(e: IssueError) -> Self { ApiError(e) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        if err.is_rejection() {
            let body = ErrorPayload { error: err.to_string(), id: err.id().map(str::to_string) };
            return (StatusCode::OK, Json(body)).into_response();
        }
        error!(error = %err, "issue store failure");
        let body = ErrorPayload { error: err.to_string(), id: None };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Request body could not be decoded.
#[derive(Debug)]
pub struct BodyRejection(pub String);

impl IntoResponse for BodyRejection {
    fn into_response(self) -> Response {
        warn!(reason = %self.0, "rejected request body");
        let body = ErrorPayload { error: self.0, id: None };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}
