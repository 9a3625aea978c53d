//! Status change records and the append-only activity log entry.

use super::{ActivityLogId, BranchName, CommitId, ProjectId, PushEvent, WorkItemId, WorkItemStatus};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event type recorded for push-driven activity.
pub const PUSH_EVENT_TYPE: &str = "github_push";

/// A status transition that was actually applied to a work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Work item that changed.
    #[serde(rename = "work_item")]
    pub work_item_id: WorkItemId,
    /// Status before the change.
    #[serde(rename = "from")]
    pub from_status: WorkItemStatus,
    /// Status after the change.
    #[serde(rename = "to")]
    pub to_status: WorkItemStatus,
    /// Commit whose message triggered the change.
    #[serde(rename = "commit")]
    pub commit_id: CommitId,
    /// Branch the push targeted.
    pub branch: BranchName,
    /// Commit author, when known.
    pub author: Option<String>,
}

/// JSON document stored with each activity log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityPayload {
    /// Kind of event, always [`PUSH_EVENT_TYPE`] for pushes.
    pub event_type: String,
    /// Branch the push targeted.
    pub branch: BranchName,
    /// Repository name carried through from the payload.
    pub repository: Option<String>,
    /// Pusher name carried through from the payload.
    pub pusher: Option<String>,
    /// Commit objects exactly as received.
    pub commits: Vec<Value>,
    /// Changes applied while processing the push, in order.
    pub updated_work_items: Vec<StatusChange>,
}

impl ActivityPayload {
    /// Summarises a processed push.
    #[must_use]
    pub fn for_push(event: &PushEvent, changes: Vec<StatusChange>) -> Self {
        Self {
            event_type: PUSH_EVENT_TYPE.to_owned(),
            branch: event.branch().clone(),
            repository: event.repository().map(str::to_owned),
            pusher: event.pusher().map(str::to_owned),
            commits: event
                .commits()
                .iter()
                .map(|commit| commit.raw().clone())
                .collect(),
            updated_work_items: changes,
        }
    }
}

/// Immutable audit record for one processed push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    id: ActivityLogId,
    project_id: ProjectId,
    payload: ActivityPayload,
    created_at: DateTime<Utc>,
}

impl ActivityLogEntry {
    /// Creates a new entry stamped with the current clock time.
    #[must_use]
    pub fn new(project_id: ProjectId, payload: ActivityPayload, clock: &impl Clock) -> Self {
        Self {
            id: ActivityLogId::new(),
            project_id,
            payload,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs an entry from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: ActivityLogId,
        project_id: ProjectId,
        payload: ActivityPayload,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            project_id,
            payload,
            created_at,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> ActivityLogId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the recorded payload.
    #[must_use]
    pub const fn payload(&self) -> &ActivityPayload {
        &self.payload
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
