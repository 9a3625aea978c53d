//! Synchronisation engine tests against the in-memory adapters.

use std::sync::Arc;

use crate::push_sync::{
    adapters::memory::{InMemoryActivityLog, InMemoryProjectDirectory, InMemoryWorkItemStore},
    domain::{
        ActivityLogEntry, ActivityLogId, BranchName, BranchPolicyKind, Commit, CommitId,
        PUSH_EVENT_TYPE, Project, ProjectId, PushEvent, StatusTable, WorkItem, WorkItemId,
        WorkItemStatus,
    },
    ports::{
        ActivityLogError, ActivityLogResult, ActivityLogSink, ProjectDirectory,
        ProjectDirectoryError, ProjectDirectoryResult, WorkItemStore, WorkItemStoreError,
        WorkItemStoreResult,
    },
    services::{
        IgnoreReason, PushSyncError, PushSyncErrorKind, PushSyncOutcome, PushSyncReport,
        PushSyncService, SyncSettings,
    },
};
use async_trait::async_trait;
use eyre::{bail, ensure};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

type MemoryService =
    PushSyncService<InMemoryWorkItemStore, InMemoryActivityLog, InMemoryProjectDirectory, DefaultClock>;

struct Harness {
    service: MemoryService,
    work_items: Arc<InMemoryWorkItemStore>,
    activity_log: Arc<InMemoryActivityLog>,
}

impl Harness {
    fn with_settings(settings: SyncSettings) -> eyre::Result<Self> {
        let tracker = project_id(1)?;
        let other = project_id(2)?;
        let work_items = Arc::new(InMemoryWorkItemStore::with_items([
            WorkItem::new(item_id(1)?, tracker, "Login form", WorkItemStatus::Pending),
            WorkItem::new(item_id(2)?, tracker, "Session expiry", WorkItemStatus::Pending),
            WorkItem::new(item_id(3)?, tracker, "Audit trail", WorkItemStatus::InProgress),
            WorkItem::new(item_id(50)?, other, "Foreign item", WorkItemStatus::Pending),
        ]));
        let activity_log = Arc::new(InMemoryActivityLog::new());
        let projects = Arc::new(InMemoryProjectDirectory::with_projects([
            Project::new(tracker, "Tracker"),
            Project::new(other, "Other"),
        ]));
        let service = PushSyncService::new(
            Arc::clone(&work_items),
            Arc::clone(&activity_log),
            projects,
            Arc::new(DefaultClock),
            settings,
        );
        Ok(Self {
            service,
            work_items,
            activity_log,
        })
    }

    fn status_of(&self, id: u64) -> eyre::Result<WorkItemStatus> {
        let Some(item) = self.work_items.get(item_id(id)?)? else {
            bail!("work item {id} missing from store");
        };
        Ok(item.status())
    }

    fn logged(&self) -> eyre::Result<usize> {
        Ok(self.activity_log.entries()?.len())
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::with_settings(tiered_settings()).expect("harness builds")
}

fn tiered_settings() -> SyncSettings {
    SyncSettings::new(StatusTable::default(), BranchPolicyKind::Tiered)
        .expect("default settings compile")
}

fn project_id(value: u64) -> eyre::Result<ProjectId> {
    Ok(ProjectId::new(value)?)
}

fn item_id(value: u64) -> eyre::Result<WorkItemId> {
    Ok(WorkItemId::new(value)?)
}

fn push(branch: &str, messages: &[&str]) -> eyre::Result<PushEvent> {
    let commits = messages
        .iter()
        .enumerate()
        .map(|(index, message)| -> eyre::Result<Commit> {
            let id = CommitId::new(format!("c0ffee{index}"))?;
            Ok(Commit::new(id, *message).with_author("Dana"))
        })
        .collect::<eyre::Result<Vec<_>>>()?;
    Ok(PushEvent::new(BranchName::new(branch)?, commits).with_repository("tracker"))
}

fn synchronized(outcome: PushSyncOutcome) -> eyre::Result<PushSyncReport> {
    match outcome {
        PushSyncOutcome::Synchronized(report) => Ok(report),
        PushSyncOutcome::Ignored { reason, .. } => bail!("push unexpectedly ignored: {reason}"),
    }
}

fn transitions(report: &PushSyncReport) -> Vec<(u64, WorkItemStatus, WorkItemStatus)> {
    report
        .changes()
        .iter()
        .map(|change| (change.work_item_id.value(), change.from_status, change.to_status))
        .collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn explicit_annotation_takes_precedence_over_global_keyword(
    harness: Harness,
) -> eyre::Result<()> {
    let event = push("dev", &["WI-1:#done WI-1 WI-2 #start"])?;

    let report = synchronized(harness.service.synchronize(project_id(1)?, &event).await?)?;

    ensure!(
        transitions(&report)
            == vec![(2, WorkItemStatus::Pending, WorkItemStatus::InProgress)]
    );
    ensure!(harness.status_of(1)? == WorkItemStatus::Pending);
    ensure!(harness.status_of(2)? == WorkItemStatus::InProgress);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unresolved_explicit_keyword_still_blocks_the_fallback(
    harness: Harness,
) -> eyre::Result<()> {
    let event = push("hotfix", &["WI-1:#shipped WI-2 #done"])?;

    let report = synchronized(harness.service.synchronize(project_id(1)?, &event).await?)?;

    ensure!(
        transitions(&report)
            == vec![(2, WorkItemStatus::Pending, WorkItemStatus::Completed)]
    );
    ensure!(harness.status_of(1)? == WorkItemStatus::Pending);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn resynchronising_the_same_push_changes_nothing_but_logs_again(
    harness: Harness,
) -> eyre::Result<()> {
    let event = push("main", &["WI-1:#done"])?;

    let first = synchronized(harness.service.synchronize(project_id(1)?, &event).await?)?;
    let second = synchronized(harness.service.synchronize(project_id(1)?, &event).await?)?;

    ensure!(first.changes().len() == 1);
    ensure!(second.changes().is_empty());
    ensure!(first.log_entry().id() != second.log_entry().id());
    ensure!(harness.logged()? == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn later_commits_observe_earlier_transitions(harness: Harness) -> eyre::Result<()> {
    let event = push("hotfix", &["WI-1 #start", "WI-1 #done"])?;

    let report = synchronized(harness.service.synchronize(project_id(1)?, &event).await?)?;

    ensure!(
        transitions(&report)
            == vec![
                (1, WorkItemStatus::Pending, WorkItemStatus::InProgress),
                (1, WorkItemStatus::InProgress, WorkItemStatus::Completed),
            ]
    );
    let commits: Vec<&str> = report
        .changes()
        .iter()
        .map(|change| change.commit_id.as_str())
        .collect();
    ensure!(commits == vec!["c0ffee0", "c0ffee1"]);
    ensure!(harness.status_of(1)? == WorkItemStatus::Completed);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeated_explicit_annotations_apply_in_order(harness: Harness) -> eyre::Result<()> {
    let event = push("hotfix", &["WI-1:#start and later WI-1:#done"])?;

    let report = synchronized(harness.service.synchronize(project_id(1)?, &event).await?)?;

    ensure!(report.changes().len() == 2);
    ensure!(harness.status_of(1)? == WorkItemStatus::Completed);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_and_foreign_work_items_are_skipped(harness: Harness) -> eyre::Result<()> {
    let event = push("main", &["WI-99:#done WI-50:#done WI-3:#done"])?;

    let report = synchronized(harness.service.synchronize(project_id(1)?, &event).await?)?;

    ensure!(
        transitions(&report)
            == vec![(3, WorkItemStatus::InProgress, WorkItemStatus::Completed)]
    );
    ensure!(harness.status_of(50)? == WorkItemStatus::Pending);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn gated_statuses_are_not_applied(harness: Harness) -> eyre::Result<()> {
    let event = push("main", &["WI-1 WI-2 #start"])?;

    let report = synchronized(harness.service.synchronize(project_id(1)?, &event).await?)?;

    ensure!(report.changes().is_empty());
    ensure!(harness.status_of(1)? == WorkItemStatus::Pending);
    ensure!(harness.logged()? == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completion_gated_policy_allows_starting_on_main() -> eyre::Result<()> {
    let settings = SyncSettings::new(StatusTable::default(), BranchPolicyKind::CompletionGated)?;
    let harness = Harness::with_settings(settings)?;
    let event = push("main", &["WI-1 #start"])?;

    let report = synchronized(harness.service.synchronize(project_id(1)?, &event).await?)?;

    ensure!(
        transitions(&report)
            == vec![(1, WorkItemStatus::Pending, WorkItemStatus::InProgress)]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn activity_entry_records_the_push(harness: Harness) -> eyre::Result<()> {
    let event = push("hotfix", &["WI-2:#start"])?.with_pusher("dana");

    let report = synchronized(harness.service.synchronize(project_id(1)?, &event).await?)?;

    let entries = harness.activity_log.entries()?;
    let Some(entry) = entries.first() else {
        bail!("no activity entry appended");
    };
    ensure!(entry == report.log_entry());
    ensure!(entry.project_id() == project_id(1)?);
    let payload = entry.payload();
    ensure!(payload.event_type == PUSH_EVENT_TYPE);
    ensure!(payload.branch.as_str() == "hotfix");
    ensure!(payload.repository.as_deref() == Some("tracker"));
    ensure!(payload.pusher.as_deref() == Some("dana"));
    ensure!(payload.commits.len() == 1);
    ensure!(payload.updated_work_items == report.changes());
    let Some(change) = payload.updated_work_items.first() else {
        bail!("no change recorded");
    };
    ensure!(change.author.as_deref() == Some("Dana"));
    ensure!(report.project().name() == "Tracker");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_push_is_ignored_without_logging(harness: Harness) -> eyre::Result<()> {
    let event = push("main", &[])?;

    let outcome = harness.service.synchronize(project_id(1)?, &event).await?;

    let PushSyncOutcome::Ignored {
        reason,
        log_entry_id,
        ..
    } = outcome
    else {
        bail!("empty push should be ignored");
    };
    ensure!(reason == IgnoreReason::NoCommits);
    ensure!(reason.message() == "No commits in push");
    ensure!(log_entry_id.is_none());
    ensure!(harness.logged()? == 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_push_can_be_logged() -> eyre::Result<()> {
    let harness = Harness::with_settings(tiered_settings().with_empty_push_logging(true))?;
    let event = push("main", &[])?;

    let outcome = harness.service.synchronize(project_id(1)?, &event).await?;

    let PushSyncOutcome::Ignored { log_entry_id, .. } = outcome else {
        bail!("empty push should be ignored");
    };
    let entries = harness.activity_log.entries()?;
    ensure!(entries.len() == 1);
    ensure!(log_entry_id == entries.first().map(|entry| entry.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unmatched_push_is_logged_by_default(harness: Harness) -> eyre::Result<()> {
    let event = push("main", &["fix typo in README"])?;

    let report = synchronized(harness.service.synchronize(project_id(1)?, &event).await?)?;

    ensure!(report.changes().is_empty());
    ensure!(harness.logged()? == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unmatched_push_can_be_ignored() -> eyre::Result<()> {
    let harness = Harness::with_settings(tiered_settings().with_unmatched_push_logging(false))?;
    let event = push("main", &["fix typo in README"])?;

    let outcome = harness.service.synchronize(project_id(1)?, &event).await?;

    let PushSyncOutcome::Ignored { reason, .. } = outcome else {
        bail!("unmatched push should be ignored");
    };
    ensure!(reason == IgnoreReason::NoReferences);
    ensure!(harness.logged()? == 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_project_is_not_found(harness: Harness) -> eyre::Result<()> {
    let event = push("main", &["WI-1:#done"])?;

    let result = harness.service.synchronize(project_id(404)?, &event).await;

    let Err(err) = result else {
        bail!("unknown project should fail");
    };
    ensure!(matches!(err, PushSyncError::ProjectNotFound(id) if id.value() == 404));
    ensure!(err.kind() == PushSyncErrorKind::NotFound);
    ensure!(harness.logged()? == 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_payload_is_a_validation_error(harness: Harness) -> eyre::Result<()> {
    let result = harness
        .service
        .synchronize_payload(project_id(1)?, b"{not json")
        .await;

    let Err(err) = result else {
        bail!("malformed payload should fail");
    };
    ensure!(err.kind() == PushSyncErrorKind::Validation);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn raw_payload_is_normalised_before_processing(harness: Harness) -> eyre::Result<()> {
    let body = serde_json::json!({
        "ref": "refs/heads/main",
        "head_commit": { "id": "abc1234", "message": "WI-3:#closed", "author": { "name": "Eve" } }
    });

    let outcome = harness
        .service
        .synchronize_payload(project_id(1)?, body.to_string().as_bytes())
        .await?;

    let report = synchronized(outcome)?;
    ensure!(report.branch().as_str() == "main");
    ensure!(harness.status_of(3)? == WorkItemStatus::Completed);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn activity_history_lists_newest_first(harness: Harness) -> eyre::Result<()> {
    let first = synchronized(
        harness
            .service
            .synchronize(project_id(1)?, &push("hotfix", &["WI-1 #start"])?)
            .await?,
    )?;
    let second = synchronized(
        harness
            .service
            .synchronize(project_id(1)?, &push("hotfix", &["WI-1 #done"])?)
            .await?,
    )?;

    let history = harness.service.activity_for_project(project_id(1)?).await?;
    let ids: Vec<_> = history.iter().map(|entry| entry.id()).collect();
    ensure!(ids == vec![second.log_entry().id(), first.log_entry().id()]);

    let other = harness.service.activity_for_project(project_id(2)?).await?;
    ensure!(other.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn activity_history_for_unknown_project_is_not_found(
    harness: Harness,
) -> eyre::Result<()> {
    let result = harness.service.activity_for_project(project_id(7)?).await;

    ensure!(matches!(result, Err(PushSyncError::ProjectNotFound(_))));
    Ok(())
}

/// Store double whose lookups always fail.
#[derive(Debug, Default)]
struct UnavailableWorkItemStore;

#[async_trait]
impl WorkItemStore for UnavailableWorkItemStore {
    async fn find_by_id_and_project(
        &self,
        _id: WorkItemId,
        _project_id: ProjectId,
    ) -> WorkItemStoreResult<Option<WorkItem>> {
        Err(WorkItemStoreError::persistence(std::io::Error::other(
            "connection reset",
        )))
    }

    async fn update_status(
        &self,
        _id: WorkItemId,
        _status: WorkItemStatus,
    ) -> WorkItemStoreResult<()> {
        Err(WorkItemStoreError::persistence(std::io::Error::other(
            "connection reset",
        )))
    }
}

/// Store double whose items disappear between lookup and update.
#[derive(Debug)]
struct VanishingWorkItemStore {
    inner: InMemoryWorkItemStore,
}

#[async_trait]
impl WorkItemStore for VanishingWorkItemStore {
    async fn find_by_id_and_project(
        &self,
        id: WorkItemId,
        project_id: ProjectId,
    ) -> WorkItemStoreResult<Option<WorkItem>> {
        self.inner.find_by_id_and_project(id, project_id).await
    }

    async fn update_status(
        &self,
        id: WorkItemId,
        _status: WorkItemStatus,
    ) -> WorkItemStoreResult<()> {
        Err(WorkItemStoreError::NotFound(id))
    }
}

fn tracker_directory() -> eyre::Result<Arc<InMemoryProjectDirectory>> {
    Ok(Arc::new(InMemoryProjectDirectory::with_projects([
        Project::new(project_id(1)?, "Tracker"),
    ])))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn store_failure_aborts_as_dependency_error() -> eyre::Result<()> {
    let activity_log = Arc::new(InMemoryActivityLog::new());
    let service = PushSyncService::new(
        Arc::new(UnavailableWorkItemStore),
        Arc::clone(&activity_log),
        tracker_directory()?,
        Arc::new(DefaultClock),
        tiered_settings(),
    );

    let result = service
        .synchronize(project_id(1)?, &push("main", &["WI-1:#done"])?)
        .await;

    let Err(err) = result else {
        bail!("store failure should abort the push");
    };
    ensure!(matches!(err, PushSyncError::WorkItemStore(_)));
    ensure!(err.kind() == PushSyncErrorKind::Dependency);
    ensure!(activity_log.entries()?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn item_removed_before_update_is_skipped() -> eyre::Result<()> {
    let store = VanishingWorkItemStore {
        inner: InMemoryWorkItemStore::with_items([WorkItem::new(
            item_id(1)?,
            project_id(1)?,
            "Login form",
            WorkItemStatus::Pending,
        )]),
    };
    let service = PushSyncService::new(
        Arc::new(store),
        Arc::new(InMemoryActivityLog::new()),
        tracker_directory()?,
        Arc::new(DefaultClock),
        tiered_settings(),
    );

    let outcome = service
        .synchronize(project_id(1)?, &push("main", &["WI-1:#done"])?)
        .await?;

    ensure!(synchronized(outcome)?.changes().is_empty());
    Ok(())
}

/// Activity log double that rejects every append.
#[derive(Debug)]
struct RejectingActivityLog;

#[async_trait]
impl ActivityLogSink for RejectingActivityLog {
    async fn append(&self, _entry: &ActivityLogEntry) -> ActivityLogResult<ActivityLogId> {
        Err(ActivityLogError::persistence(std::io::Error::other(
            "disk full",
        )))
    }
}

/// Project directory double whose backend is unreachable.
#[derive(Debug)]
struct UnreachableProjectDirectory;

#[async_trait]
impl ProjectDirectory for UnreachableProjectDirectory {
    async fn find_project(&self, _id: ProjectId) -> ProjectDirectoryResult<Option<Project>> {
        Err(ProjectDirectoryError::persistence(std::io::Error::other(
            "connection refused",
        )))
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn log_failure_is_a_dependency_error_after_updates_are_written() -> eyre::Result<()> {
    let work_items = Arc::new(InMemoryWorkItemStore::with_items([WorkItem::new(
        item_id(1)?,
        project_id(1)?,
        "Login form",
        WorkItemStatus::Pending,
    )]));
    let service = PushSyncService::new(
        Arc::clone(&work_items),
        Arc::new(RejectingActivityLog),
        tracker_directory()?,
        Arc::new(DefaultClock),
        tiered_settings(),
    );

    let result = service
        .synchronize(project_id(1)?, &push("main", &["WI-1:#done"])?)
        .await;

    let Err(err) = result else {
        bail!("activity log failure should fail the push");
    };
    ensure!(matches!(err, PushSyncError::ActivityLog(_)));
    ensure!(err.kind() == PushSyncErrorKind::Dependency);
    let stored = work_items.get(item_id(1)?)?;
    ensure!(stored.map(|item| item.status()) == Some(WorkItemStatus::Completed));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn directory_failure_is_a_dependency_error() -> eyre::Result<()> {
    let work_items = Arc::new(InMemoryWorkItemStore::with_items([WorkItem::new(
        item_id(1)?,
        project_id(1)?,
        "Login form",
        WorkItemStatus::Pending,
    )]));
    let activity_log = Arc::new(InMemoryActivityLog::new());
    let service = PushSyncService::new(
        Arc::clone(&work_items),
        Arc::clone(&activity_log),
        Arc::new(UnreachableProjectDirectory),
        Arc::new(DefaultClock),
        tiered_settings(),
    );

    let result = service
        .synchronize(project_id(1)?, &push("main", &["WI-1:#done"])?)
        .await;

    let Err(err) = result else {
        bail!("directory failure should fail the push");
    };
    ensure!(matches!(err, PushSyncError::ProjectDirectory(_)));
    ensure!(err.kind() == PushSyncErrorKind::Dependency);
    let stored = work_items.get(item_id(1)?)?;
    ensure!(stored.map(|item| item.status()) == Some(WorkItemStatus::Pending));
    ensure!(activity_log.entries()?.is_empty());
    Ok(())
}
