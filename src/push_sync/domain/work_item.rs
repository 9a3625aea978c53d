//! Work item and project views used by the synchroniser.

use super::{ProjectId, WorkItemId, WorkItemStatus};
use serde::{Deserialize, Serialize};

/// The slice of a work item the synchroniser reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    id: WorkItemId,
    project_id: ProjectId,
    title: String,
    status: WorkItemStatus,
}

impl WorkItem {
    /// Creates a work item view.
    #[must_use]
    pub fn new(
        id: WorkItemId,
        project_id: ProjectId,
        title: impl Into<String>,
        status: WorkItemStatus,
    ) -> Self {
        Self {
            id,
            project_id,
            title: title.into(),
            status,
        }
    }

    /// Returns the work item identifier.
    #[must_use]
    pub const fn id(&self) -> WorkItemId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> WorkItemStatus {
        self.status
    }
}

/// A project as seen by the webhook boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    name: String,
}

impl Project {
    /// Creates a project view.
    #[must_use]
    pub fn new(id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the project name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
