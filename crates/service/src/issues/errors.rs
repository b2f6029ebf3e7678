use thiserror::Error;

use crate::errors::ServiceError;

/// Outcomes of issue operations that are reported back to the caller.
#[derive(Debug, Error)]
pub enum IssueError {
    #[error("required field(s) missing")]
    Validation,
    #[error("missing _id")]
    MissingId,
    #[error("no update field(s) sent")]
    NoUpdateFields { id: String },
    #[error("could not update")]
    UpdateFailed { id: String },
    #[error("could not delete")]
    DeleteFailed { id: String },
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl IssueError {
    /// The `_id` under contention, echoed back to the client.
    pub fn id(&self) -> Option<&str> {
        match self {
            IssueError::NoUpdateFields { id }
            | IssueError::UpdateFailed { id }
            | IssueError::DeleteFailed { id } => Some(id),
            IssueError::Validation | IssueError::MissingId | IssueError::Service(_) => None,
        }
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            IssueError::Validation => "validation",
            IssueError::MissingId => "missing_id",
            IssueError::NoUpdateFields { .. } => "no_update_fields",
            IssueError::UpdateFailed { .. } => "update_failed",
            IssueError::DeleteFailed { .. } => "delete_failed",
            IssueError::Service(_) => "internal",
        }
    }

    /// Whether this is a client-facing rejection rather than an infrastructure fault.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, IssueError::Service(_))
    }
}
