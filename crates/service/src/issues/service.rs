use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::metrics;
use crate::storage::KvStore;

use super::capabilities::{format_timestamp, Clock, IdGenerator, SystemClock, UuidV4Ids};
use super::domain::{Acknowledgement, Issue, IssuePatch, IssueRef, NewIssue};
use super::errors::IssueError;
use super::filter::apply_filters;
use super::repository::ProjectRepository;

/// Issue business service independent of web framework.
///
/// Every mutation is a read-modify-write of the whole project collection
/// with no lock held across it; concurrent writers are last-write-wins.
pub struct IssueService {
    repo: ProjectRepository,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl IssueService {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { repo: ProjectRepository::new(store), clock, ids }
    }

    /// Wall clock and random v4 UUIDs.
    pub fn with_system_defaults(store: Arc<dyn KvStore>) -> Self {
        Self::new(store, Arc::new(SystemClock), Arc::new(UuidV4Ids))
    }

    fn timestamp(&self) -> String { format_timestamp(self.clock.now()) }

    /// List a project's issues, narrowed by query filters when any are given.
    #[instrument(skip(self, filters), fields(project = %project, filters = filters.len()))]
    pub async fn list(&self, project: &str, filters: &[(String, String)]) -> Result<Vec<Issue>, IssueError> {
        let mut issues = self.repo.load(project).await?;
        if !issues.is_empty() && !filters.is_empty() {
            issues = apply_filters(issues, filters);
        }
        debug!(count = issues.len(), "issues listed");
        metrics::record("list", "ok");
        Ok(issues)
    }

    /// Create an issue and append it to the project.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::issues::{IssueService, NewIssue};
    /// use service::issues::capabilities::mock::{FixedClock, SequentialIds};
    /// use service::storage::MemoryKvStore;
    /// let svc = IssueService::new(
    ///     Arc::new(MemoryKvStore::default()),
    ///     Arc::new(FixedClock::at("2025-03-24T08:21:42.420Z")),
    ///     Arc::new(SequentialIds::new("issue")),
    /// );
    /// let input = NewIssue {
    ///     issue_title: Some("Broken build".into()),
    ///     issue_text: Some("CI is red".into()),
    ///     created_by: Some("me".into()),
    ///     ..Default::default()
    /// };
    /// let issue = tokio_test::block_on(svc.create("apitest", input)).unwrap();
    /// assert_eq!(issue.id, "issue-1");
    /// assert_eq!(issue.created_on, "2025-03-24T08:21:42.420Z");
    /// assert!(issue.open);
    /// ```
    #[instrument(skip(self, input), fields(project = %project))]
    pub async fn create(&self, project: &str, input: NewIssue) -> Result<Issue, IssueError> {
        let valid = match input.validate() {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "create rejected");
                metrics::record("create", e.kind());
                return Err(e);
            }
        };

        let now = self.timestamp();
        let issue = Issue {
            id: self.ids.next_id(),
            issue_title: valid.issue_title,
            issue_text: valid.issue_text,
            created_by: valid.created_by,
            assigned_to: valid.assigned_to,
            status_text: valid.status_text,
            open: true,
            created_on: now.clone(),
            updated_on: now,
        };

        let mut issues = self.repo.load(project).await?;
        issues.push(issue.clone());
        self.repo.save(project, &issues).await?;

        info!(issue_id = %issue.id, "issue_created");
        metrics::record("create", "ok");
        Ok(issue)
    }

    /// Apply a partial update. The updated issue moves to the end of the
    /// collection. Any failure past input checks reports `UpdateFailed`.
    #[instrument(skip(self, patch), fields(project = %project))]
    pub async fn update(&self, project: &str, patch: IssuePatch) -> Result<Acknowledgement, IssueError> {
        let outcome = self.try_update(project, &patch).await;
        match &outcome {
            Ok(ack) => {
                info!(issue_id = %ack.id, "issue_updated");
                metrics::record("update", "ok");
            }
            Err(e) => {
                debug!(error = %e, "update rejected");
                metrics::record("update", e.kind());
            }
        }
        outcome
    }

    async fn try_update(&self, project: &str, patch: &IssuePatch) -> Result<Acknowledgement, IssueError> {
        let id = patch.target().ok_or(IssueError::MissingId)?.to_string();
        if !patch.has_changes() {
            return Err(IssueError::NoUpdateFields { id });
        }

        match self.replace_issue(project, &id, patch).await {
            Ok(true) => Ok(Acknowledgement::updated(id)),
            Ok(false) => Err(IssueError::UpdateFailed { id }),
            Err(e) => {
                warn!(issue_id = %id, error = %e, "update failed");
                Err(IssueError::UpdateFailed { id })
            }
        }
    }

    /// Returns `false` unless exactly one issue carries `id`.
    async fn replace_issue(&self, project: &str, id: &str, patch: &IssuePatch) -> Result<bool, IssueError> {
        let mut issues = self.repo.load(project).await?;
        let positions: Vec<usize> = issues
            .iter()
            .enumerate()
            .filter(|(_, issue)| issue.id == id)
            .map(|(pos, _)| pos)
            .collect();
        let &[pos] = positions.as_slice() else {
            return Ok(false);
        };

        let mut issue = issues.remove(pos);
        patch.apply_to(&mut issue);
        issue.updated_on = self.timestamp();
        issues.push(issue);
        self.repo.save(project, &issues).await?;
        Ok(true)
    }

    /// Delete every issue with the given `_id`.
    #[instrument(skip(self, target), fields(project = %project))]
    pub async fn delete(&self, project: &str, target: IssueRef) -> Result<Acknowledgement, IssueError> {
        let outcome = self.try_delete(project, &target).await;
        match &outcome {
            Ok(ack) => {
                info!(issue_id = %ack.id, "issue_deleted");
                metrics::record("delete", "ok");
            }
            Err(e) => {
                debug!(error = %e, "delete rejected");
                metrics::record("delete", e.kind());
            }
        }
        outcome
    }

    async fn try_delete(&self, project: &str, target: &IssueRef) -> Result<Acknowledgement, IssueError> {
        let id = target.target().ok_or(IssueError::MissingId)?.to_string();

        let mut issues = self.repo.load(project).await?;
        let before = issues.len();
        issues.retain(|issue| issue.id != id);
        if issues.len() == before {
            return Err(IssueError::DeleteFailed { id });
        }

        self.repo.save(project, &issues).await?;
        Ok(Acknowledgement::deleted(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ServiceError;
    use crate::issues::capabilities::mock::{FixedClock, SequentialIds};
    use crate::storage::MemoryKvStore;
    use async_trait::async_trait;

    const SEED: &str = r#"[
        {"_id":"67e11616134c1f00138a33bf","issue_title":"Test issue 1","issue_text":"Test issue 1 in project testproj","created_by":"me1","assigned_to":"you1","status_text":"open","open":true,"created_on":"2025-03-25T08:21:42.420Z","updated_on":"2025-03-25T08:21:42.420Z"},
        {"_id":"67e11616134c1f00138a33be","issue_title":"Test issue 2","issue_text":"Test issue 2 in project testproj","created_by":"me1","assigned_to":"you","status_text":"open","open":false,"created_on":"2026-03-25T08:21:42.420Z","updated_on":"2026-03-25T08:21:42.420Z"},
        {"_id":"67e11616134c1f00138a33bg","issue_title":"Test issue 3","issue_text":"Test issue 3 in project testproj","created_by":"me1","assigned_to":"you","status_text":"open","open":true,"created_on":"2025-03-25T08:21:42.420Z","updated_on":"2025-03-25T08:21:42.420Z"}
    ]"#;

    struct Harness {
        svc: IssueService,
        store: Arc<MemoryKvStore>,
        clock: Arc<FixedClock>,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryKvStore::with_entries([("testproj", SEED)]));
        let clock = Arc::new(FixedClock::at("2027-01-01T00:00:00.000Z"));
        let svc = IssueService::new(store.clone(), clock.clone(), Arc::new(SequentialIds::new("id")));
        Harness { svc, store, clock }
    }

    async fn stored(store: &MemoryKvStore, project: &str) -> Vec<Issue> {
        let raw = store.get(project).await.unwrap().unwrap_or_else(|| "[]".into());
        serde_json::from_str(&raw).unwrap()
    }

    fn patch(id: Option<&str>) -> IssuePatch {
        IssuePatch { id: id.map(str::to_string), ..Default::default() }
    }

    #[tokio::test]
    async fn create_with_all_fields() -> anyhow::Result<()> {
        let h = harness();
        let issue = h
            .svc
            .create(
                "apitest",
                NewIssue {
                    issue_title: Some("MyFullTest".into()),
                    issue_text: Some("MyFullTestText".into()),
                    created_by: Some("me".into()),
                    assigned_to: Some("you".into()),
                    status_text: Some("open".into()),
                },
            )
            .await?;
        assert_eq!(issue.id, "id-1");
        assert_eq!(issue.assigned_to, "you");
        assert_eq!(issue.status_text, "open");
        assert_eq!(issue.created_on, "2027-01-01T00:00:00.000Z");
        assert_eq!(issue.updated_on, issue.created_on);
        assert_eq!(stored(&h.store, "apitest").await, vec![issue]);
        Ok(())
    }

    #[tokio::test]
    async fn create_appends_to_existing_project() -> anyhow::Result<()> {
        let h = harness();
        let input = NewIssue {
            issue_title: Some("t".into()),
            issue_text: Some("x".into()),
            created_by: Some("me".into()),
            ..Default::default()
        };
        let issue = h.svc.create("testproj", input).await?;
        let all = stored(&h.store, "testproj").await;
        assert_eq!(all.len(), 4);
        assert_eq!(all.last(), Some(&issue));
        Ok(())
    }

    #[tokio::test]
    async fn create_missing_fields_persists_nothing() {
        let h = harness();
        let res = h.svc.create("apitest", NewIssue::default()).await;
        assert!(matches!(res, Err(IssueError::Validation)));
        assert_eq!(h.store.get("apitest").await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_unknown_project_is_empty() -> anyhow::Result<()> {
        let h = harness();
        assert!(h.svc.list("nope", &[("open".into(), "true".into())]).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn list_filters_by_open_flag() -> anyhow::Result<()> {
        let h = harness();
        let out = h.svc.list("testproj", &[("open".into(), "false".into())]).await?;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "67e11616134c1f00138a33be");
        Ok(())
    }

    #[tokio::test]
    async fn update_moves_issue_to_end_and_refreshes_timestamp() -> anyhow::Result<()> {
        let h = harness();
        h.clock.advance(chrono::Duration::milliseconds(5));
        let mut p = patch(Some("67e11616134c1f00138a33bf"));
        p.issue_title = Some("Test issue 1 - Updated".into());
        let ack = h.svc.update("testproj", p).await?;
        assert_eq!(ack, Acknowledgement::updated("67e11616134c1f00138a33bf"));

        let all = stored(&h.store, "testproj").await;
        let last = all.last().unwrap();
        assert_eq!(last.id, "67e11616134c1f00138a33bf");
        assert_eq!(last.issue_title, "Test issue 1 - Updated");
        assert_eq!(last.assigned_to, "you1");
        assert_eq!(last.created_on, "2025-03-25T08:21:42.420Z");
        assert_eq!(last.updated_on, "2027-01-01T00:00:00.005Z");
        assert_eq!(all[0].id, "67e11616134c1f00138a33be");
        Ok(())
    }

    #[tokio::test]
    async fn update_rejections() {
        let h = harness();
        let mut no_id = patch(None);
        no_id.issue_title = Some("x".into());
        assert!(matches!(h.svc.update("testproj", no_id).await, Err(IssueError::MissingId)));

        let only_id = patch(Some("67e11616134c1f00138a33bf"));
        assert!(matches!(
            h.svc.update("testproj", only_id).await,
            Err(IssueError::NoUpdateFields { id }) if id == "67e11616134c1f00138a33bf"
        ));

        let mut unknown = patch(Some("none existing"));
        unknown.issue_text = Some("alibi change".into());
        assert!(matches!(
            h.svc.update("testproj", unknown).await,
            Err(IssueError::UpdateFailed { id }) if id == "none existing"
        ));
    }

    #[tokio::test]
    async fn update_with_duplicate_ids_fails() {
        let dup = r#"[
            {"_id":"x","issue_title":"a","issue_text":"a","created_by":"a","created_on":"2025-01-01T00:00:00.000Z","updated_on":"2025-01-01T00:00:00.000Z"},
            {"_id":"x","issue_title":"b","issue_text":"b","created_by":"b","created_on":"2025-01-01T00:00:00.000Z","updated_on":"2025-01-01T00:00:00.000Z"}
        ]"#;
        let store = Arc::new(MemoryKvStore::with_entries([("p", dup)]));
        let svc = IssueService::with_system_defaults(store);
        let mut p = patch(Some("x"));
        p.open = Some(false);
        assert!(matches!(svc.update("p", p).await, Err(IssueError::UpdateFailed { .. })));
    }

    #[tokio::test]
    async fn repeated_update_is_idempotent() -> anyhow::Result<()> {
        let h = harness();
        let mut p = patch(Some("67e11616134c1f00138a33bg"));
        p.assigned_to = Some("Nobody".into());
        p.open = Some(false);
        h.svc.update("testproj", p.clone()).await?;
        let once = stored(&h.store, "testproj").await;
        h.svc.update("testproj", p).await?;
        assert_eq!(stored(&h.store, "testproj").await, once);
        Ok(())
    }

    struct FailingWrites(MemoryKvStore);

    #[async_trait]
    impl KvStore for FailingWrites {
        async fn get(&self, key: &str) -> Result<Option<String>, ServiceError> { self.0.get(key).await }
        async fn set(&self, _key: &str, _value: String) -> Result<(), ServiceError> {
            Err(ServiceError::Storage("read-only".into()))
        }
    }

    #[tokio::test]
    async fn storage_failure_during_update_maps_to_update_failed() {
        let store = Arc::new(FailingWrites(MemoryKvStore::with_entries([("testproj", SEED)])));
        let svc = IssueService::with_system_defaults(store);
        let mut p = patch(Some("67e11616134c1f00138a33bf"));
        p.status_text = Some("closed".into());
        assert!(matches!(
            svc.update("testproj", p).await,
            Err(IssueError::UpdateFailed { id }) if id == "67e11616134c1f00138a33bf"
        ));

        let input = NewIssue {
            issue_title: Some("t".into()),
            issue_text: Some("x".into()),
            created_by: Some("me".into()),
            ..Default::default()
        };
        assert!(matches!(svc.create("testproj", input).await, Err(IssueError::Service(_))));
    }

    #[tokio::test]
    async fn corrupt_collection_maps_to_update_failed() {
        let store = Arc::new(MemoryKvStore::with_entries([("p", "not json")]));
        let svc = IssueService::with_system_defaults(store);
        let mut p = patch(Some("x"));
        p.issue_title = Some("t".into());
        assert!(matches!(svc.update("p", p).await, Err(IssueError::UpdateFailed { .. })));
        assert!(matches!(svc.list("p", &[]).await, Err(IssueError::Service(_))));
    }

    #[tokio::test]
    async fn delete_paths() -> anyhow::Result<()> {
        let h = harness();
        let missing = h.svc.delete("testproj", IssueRef::default()).await;
        assert!(matches!(missing, Err(IssueError::MissingId)));

        let before = h.store.get("testproj").await?;
        let invalid = h.svc.delete("testproj", IssueRef { id: Some("invalid".into()) }).await;
        assert!(matches!(invalid, Err(IssueError::DeleteFailed { id }) if id == "invalid"));
        assert_eq!(h.store.get("testproj").await?, before);

        let ack = h
            .svc
            .delete("testproj", IssueRef { id: Some("67e11616134c1f00138a33bf".into()) })
            .await?;
        assert_eq!(ack, Acknowledgement::deleted("67e11616134c1f00138a33bf"));
        let left = stored(&h.store, "testproj").await;
        assert_eq!(left.len(), 2);
        assert!(left.iter().all(|i| i.id != "67e11616134c1f00138a33bf"));
        Ok(())
    }
}
