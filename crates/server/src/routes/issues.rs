use axum::{
    extract::{Path, Query, State},
    Json,
};
use service::issues::{Acknowledgement, Issue, IssuePatch, IssueRef, NewIssue};

use super::AppState;
use crate::errors::ApiError;
use crate::extract::FormOrJson;

/// `GET /api/issues/:project`. Query-string pairs are filters, applied in order.
pub async fn list_issues(
    State(state): State<AppState>,
    Path(project): Path<String>,
    Query(filters): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Issue>>, ApiError> {
    let issues = state.issues.list(&project, &filters).await?;
    Ok(Json(issues))
}

/// `POST /api/issues/:project`
pub async fn create_issue(
    State(state): State<AppState>,
    Path(project): Path<String>,
    FormOrJson(input): FormOrJson<NewIssue>,
) -> Result<Json<Issue>, ApiError> {
    let issue = state.issues.create(&project, input).await?;
    Ok(Json(issue))
}

/// `PUT /api/issues/:project`
pub async fn update_issue(
    State(state): State<AppState>,
    Path(project): Path<String>,
    FormOrJson(patch): FormOrJson<IssuePatch>,
) -> Result<Json<Acknowledgement>, ApiError> {
    let ack = state.issues.update(&project, patch).await?;
    Ok(Json(ack))
}

/// `DELETE /api/issues/:project`
pub async fn delete_issue(
    State(state): State<AppState>,
    Path(project): Path<String>,
    FormOrJson(target): FormOrJson<IssueRef>,
) -> Result<Json<Acknowledgement>, ApiError> {
    let ack = state.issues.delete(&project, target).await?;
    Ok(Json(ack))
}
