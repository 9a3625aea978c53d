//! Synchronisation engine turning push events into work item status changes.

use super::locks::WorkItemLocks;
use crate::push_sync::{
    domain::{
        ActivityLogEntry, ActivityLogId, ActivityPayload, BranchName, BranchPolicy, Commit,
        Project, ProjectId, PushEvent, PushPayloadError, PushSyncDomainError, ReferenceGrammar,
        StatusChange, StatusTable, WorkItemId, WorkItemStatus,
    },
    ports::{
        ActivityLogError, ActivityLogHistory, ActivityLogSink, ProjectDirectory,
        ProjectDirectoryError, WorkItemStore, WorkItemStoreError,
    },
};
use mockable::Clock;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Immutable engine configuration, built once at startup and shared.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    table: StatusTable,
    grammar: Arc<ReferenceGrammar>,
    policy: Arc<dyn BranchPolicy>,
    log_empty_pushes: bool,
    log_unmatched_pushes: bool,
}

impl SyncSettings {
    /// Compiles the commit grammar for `table` and pairs it with `policy`.
    ///
    /// Empty pushes are not logged; pushes without references are.
    ///
    /// # Errors
    ///
    /// Returns [`PushSyncDomainError::Grammar`] when the grammar fails to
    /// compile.
    pub fn new(
        table: StatusTable,
        policy: impl BranchPolicy + 'static,
    ) -> Result<Self, PushSyncDomainError> {
        let grammar = ReferenceGrammar::compile(&table)?;
        Ok(Self {
            table,
            grammar: Arc::new(grammar),
            policy: Arc::new(policy),
            log_empty_pushes: false,
            log_unmatched_pushes: true,
        })
    }

    /// Sets whether a push without commits still appends an activity entry.
    #[must_use]
    pub const fn with_empty_push_logging(mut self, enabled: bool) -> Self {
        self.log_empty_pushes = enabled;
        self
    }

    /// Sets whether a push whose commits reference no work item appends an
    /// activity entry. When disabled such pushes are reported as ignored.
    #[must_use]
    pub const fn with_unmatched_push_logging(mut self, enabled: bool) -> Self {
        self.log_unmatched_pushes = enabled;
        self
    }

    /// Returns the keyword table.
    #[must_use]
    pub const fn table(&self) -> &StatusTable {
        &self.table
    }

    /// Returns the active branch policy.
    #[must_use]
    pub fn policy(&self) -> &dyn BranchPolicy {
        self.policy.as_ref()
    }

    /// Resolves `keyword` and checks it against the branch policy.
    fn permitted_status(&self, keyword: &str, branch: &BranchName) -> Option<WorkItemStatus> {
        let status = self.table.resolve(keyword);
        let permitted = status.filter(|target| self.policy.is_allowed(branch, *target));
        if permitted.is_none() {
            tracing::debug!(
                keyword,
                branch = %branch,
                resolved = status.map(WorkItemStatus::as_str),
                "status keyword skipped"
            );
        }
        permitted
    }
}

/// Why a push was accepted without processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The push carried no commits.
    NoCommits,
    /// No commit message referenced a work item.
    NoReferences,
}

impl IgnoreReason {
    /// Returns a human-readable explanation.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NoCommits => "No commits in push",
            Self::NoReferences => "No work item references in push",
        }
    }
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of a fully processed push.
#[derive(Debug, Clone, PartialEq)]
pub struct PushSyncReport {
    project: Project,
    changes: Vec<StatusChange>,
    log_entry: ActivityLogEntry,
}

impl PushSyncReport {
    /// Returns the project the push belonged to.
    #[must_use]
    pub const fn project(&self) -> &Project {
        &self.project
    }

    /// Returns the branch the push targeted.
    #[must_use]
    pub const fn branch(&self) -> &BranchName {
        &self.log_entry.payload().branch
    }

    /// Returns applied changes in commit order.
    #[must_use]
    pub fn changes(&self) -> &[StatusChange] {
        &self.changes
    }

    /// Returns the activity log entry written for the push.
    #[must_use]
    pub const fn log_entry(&self) -> &ActivityLogEntry {
        &self.log_entry
    }
}

/// Outcome of [`PushSyncService::synchronize`].
#[derive(Debug, Clone, PartialEq)]
pub enum PushSyncOutcome {
    /// The push was accepted but nothing was processed.
    Ignored {
        /// Project the push belonged to.
        project: Project,
        /// Why the push was ignored.
        reason: IgnoreReason,
        /// Entry written anyway, when configured to log ignored pushes.
        log_entry_id: Option<ActivityLogId>,
    },
    /// The push was processed and logged.
    Synchronized(PushSyncReport),
}

/// Coarse classification of [`PushSyncError`] for callers mapping to
/// transport status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushSyncErrorKind {
    /// The caller sent an unusable payload.
    Validation,
    /// The addressed project does not exist.
    NotFound,
    /// A collaborator failed.
    Dependency,
}

/// Errors aborting a synchronisation.
#[derive(Debug, Clone, Error)]
pub enum PushSyncError {
    /// The push payload could not be normalised.
    #[error(transparent)]
    InvalidPayload(#[from] PushPayloadError),

    /// The project does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// Project lookup failed.
    #[error(transparent)]
    ProjectDirectory(#[from] ProjectDirectoryError),

    /// Work item lookup or update failed.
    #[error(transparent)]
    WorkItemStore(#[from] WorkItemStoreError),

    /// Activity log access failed.
    #[error(transparent)]
    ActivityLog(#[from] ActivityLogError),
}

impl PushSyncError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> PushSyncErrorKind {
        match self {
            Self::InvalidPayload(_) => PushSyncErrorKind::Validation,
            Self::ProjectNotFound(_) => PushSyncErrorKind::NotFound,
            Self::ProjectDirectory(_) | Self::WorkItemStore(_) | Self::ActivityLog(_) => {
                PushSyncErrorKind::Dependency
            }
        }
    }
}

/// Result type for push synchronisation operations.
pub type PushSyncResult<T> = Result<T, PushSyncError>;

/// The synchronisation engine.
///
/// Stateless across pushes apart from the in-process write locks; commits are
/// processed strictly in payload order so later commits observe the effects
/// of earlier ones.
pub struct PushSyncService<W, L, P, C>
where
    W: WorkItemStore,
    L: ActivityLogSink,
    P: ProjectDirectory,
    C: Clock + Send + Sync,
{
    work_items: Arc<W>,
    activity_log: Arc<L>,
    projects: Arc<P>,
    clock: Arc<C>,
    settings: Arc<SyncSettings>,
    locks: Arc<WorkItemLocks>,
}

impl<W, L, P, C> Clone for PushSyncService<W, L, P, C>
where
    W: WorkItemStore,
    L: ActivityLogSink,
    P: ProjectDirectory,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            work_items: Arc::clone(&self.work_items),
            activity_log: Arc::clone(&self.activity_log),
            projects: Arc::clone(&self.projects),
            clock: Arc::clone(&self.clock),
            settings: Arc::clone(&self.settings),
            locks: Arc::clone(&self.locks),
        }
    }
}

/// Per-commit context threaded through status application.
struct CommitScope<'a> {
    project_id: ProjectId,
    branch: &'a BranchName,
    commit: &'a Commit,
}

impl<W, L, P, C> PushSyncService<W, L, P, C>
where
    W: WorkItemStore,
    L: ActivityLogSink,
    P: ProjectDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a new synchronisation service.
    #[must_use]
    pub fn new(
        work_items: Arc<W>,
        activity_log: Arc<L>,
        projects: Arc<P>,
        clock: Arc<C>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            work_items,
            activity_log,
            projects,
            clock,
            settings: Arc::new(settings),
            locks: Arc::new(WorkItemLocks::default()),
        }
    }

    /// Parses a raw webhook body and synchronises it.
    ///
    /// # Errors
    ///
    /// Returns [`PushSyncError::InvalidPayload`] for unusable bodies, and
    /// otherwise whatever [`Self::synchronize`] returns.
    pub async fn synchronize_payload(
        &self,
        project_id: ProjectId,
        body: &[u8],
    ) -> PushSyncResult<PushSyncOutcome> {
        let event = PushEvent::from_json_slice(body)?;
        self.synchronize(project_id, &event).await
    }

    /// Applies the status changes requested by a push and records them.
    ///
    /// Unknown work items and unresolvable or disallowed keywords are
    /// skipped silently. A collaborator failure aborts the remaining
    /// processing; changes already written stay written.
    ///
    /// # Errors
    ///
    /// Returns [`PushSyncError::ProjectNotFound`] when the project does not
    /// exist, or a dependency variant when a port fails.
    #[tracing::instrument(
        skip_all,
        fields(project_id = %project_id, branch = %event.branch(), commits = event.commits().len())
    )]
    pub async fn synchronize(
        &self,
        project_id: ProjectId,
        event: &PushEvent,
    ) -> PushSyncResult<PushSyncOutcome> {
        let result = self.run(project_id, event).await;
        if let Err(err) = &result {
            if err.kind() == PushSyncErrorKind::Dependency {
                tracing::error!(error = %err, "push synchronisation aborted");
            }
        }
        result
    }

    async fn run(&self, project_id: ProjectId, event: &PushEvent) -> PushSyncResult<PushSyncOutcome> {
        let project = self
            .projects
            .find_project(project_id)
            .await?
            .ok_or(PushSyncError::ProjectNotFound(project_id))?;

        if event.commits().is_empty() {
            tracing::info!("push carries no commits");
            let log_entry_id = if self.settings.log_empty_pushes {
                Some(self.record(project_id, event, Vec::new()).await?.id())
            } else {
                None
            };
            return Ok(PushSyncOutcome::Ignored {
                project,
                reason: IgnoreReason::NoCommits,
                log_entry_id,
            });
        }

        let mut changes = Vec::new();
        let mut referenced_any = false;
        for commit in event.commits() {
            let scope = CommitScope {
                project_id,
                branch: event.branch(),
                commit,
            };
            referenced_any |= self.process_commit(&scope, &mut changes).await?;
        }

        if !referenced_any && !self.settings.log_unmatched_pushes {
            tracing::info!("push references no work items");
            return Ok(PushSyncOutcome::Ignored {
                project,
                reason: IgnoreReason::NoReferences,
                log_entry_id: None,
            });
        }

        let log_entry = self.record(project_id, event, changes.clone()).await?;
        tracing::info!(
            updated = changes.len(),
            activity_log_id = %log_entry.id(),
            "push synchronised"
        );
        Ok(PushSyncOutcome::Synchronized(PushSyncReport {
            project,
            changes,
            log_entry,
        }))
    }

    /// Processes one commit, appending applied changes to `changes`.
    ///
    /// Returns whether the message referenced any work item.
    async fn process_commit(
        &self,
        scope: &CommitScope<'_>,
        changes: &mut Vec<StatusChange>,
    ) -> PushSyncResult<bool> {
        let extracted = self.settings.grammar.extract(scope.commit.message());
        tracing::debug!(
            commit = scope.commit.id().short(),
            explicit = extracted.explicit().len(),
            mentioned = extracted.mentioned().len(),
            global = extracted.global_keyword(),
            "scanned commit message"
        );

        let mut handled = HashSet::new();
        for reference in extracted.explicit() {
            handled.insert(reference.id());
            let Some(target) = self
                .settings
                .permitted_status(reference.keyword(), scope.branch)
            else {
                continue;
            };
            changes.extend(self.apply(scope, reference.id(), target).await?);
        }

        let global_target = extracted
            .global_keyword()
            .and_then(|keyword| self.settings.permitted_status(keyword, scope.branch));
        if let Some(target) = global_target {
            for id in extracted
                .mentioned()
                .iter()
                .filter(|id| !handled.contains(*id))
            {
                changes.extend(self.apply(scope, *id, target).await?);
            }
        }

        Ok(!extracted.is_empty())
    }

    /// Moves one work item to `target` if it exists and differs.
    async fn apply(
        &self,
        scope: &CommitScope<'_>,
        id: WorkItemId,
        target: WorkItemStatus,
    ) -> PushSyncResult<Option<StatusChange>> {
        let _guard = self.locks.acquire(id).await;

        let Some(item) = self
            .work_items
            .find_by_id_and_project(id, scope.project_id)
            .await?
        else {
            tracing::debug!(work_item_id = %id, "work item not found in project");
            return Ok(None);
        };

        let from_status = item.status();
        if from_status == target {
            tracing::debug!(work_item_id = %id, status = %target, "work item already in status");
            return Ok(None);
        }

        match self.work_items.update_status(id, target).await {
            Ok(()) => {}
            Err(WorkItemStoreError::NotFound(_)) => {
                tracing::debug!(work_item_id = %id, "work item removed before update");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        }

        tracing::info!(
            work_item_id = %id,
            from = %from_status,
            to = %target,
            commit = scope.commit.id().short(),
            "work item status updated"
        );
        Ok(Some(StatusChange {
            work_item_id: id,
            from_status,
            to_status: target,
            commit_id: scope.commit.id().clone(),
            branch: scope.branch.clone(),
            author: scope.commit.author_name().map(str::to_owned),
        }))
    }

    async fn record(
        &self,
        project_id: ProjectId,
        event: &PushEvent,
        changes: Vec<StatusChange>,
    ) -> PushSyncResult<ActivityLogEntry> {
        let payload = ActivityPayload::for_push(event, changes);
        let entry = ActivityLogEntry::new(project_id, payload, &*self.clock);
        self.activity_log.append(&entry).await?;
        Ok(entry)
    }
}

impl<W, L, P, C> PushSyncService<W, L, P, C>
where
    W: WorkItemStore,
    L: ActivityLogSink + ActivityLogHistory,
    P: ProjectDirectory,
    C: Clock + Send + Sync,
{
    /// Lists the activity entries of a project, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`PushSyncError::ProjectNotFound`] when the project does not
    /// exist, or a dependency variant when a port fails.
    pub async fn activity_for_project(
        &self,
        project_id: ProjectId,
    ) -> PushSyncResult<Vec<ActivityLogEntry>> {
        self.projects
            .find_project(project_id)
            .await?
            .ok_or(PushSyncError::ProjectNotFound(project_id))?;
        Ok(self.activity_log.list_for_project(project_id).await?)
    }
}
