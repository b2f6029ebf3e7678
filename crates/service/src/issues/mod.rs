//! Issue tracking: per-project issue collections with create, filtered list,
//! partial update and delete.

pub mod capabilities;
pub mod domain;
pub mod errors;
pub mod filter;
pub mod repository;
pub mod service;

pub use domain::{Acknowledgement, Issue, IssuePatch, IssueRef, NewIssue};
pub use errors::IssueError;
pub use service::IssueService;
