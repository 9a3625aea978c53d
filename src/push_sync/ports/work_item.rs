//! Store port for work item lookup and status updates.

use crate::push_sync::domain::{ProjectId, WorkItem, WorkItemId, WorkItemStatus};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for work item store operations.
pub type WorkItemStoreResult<T> = Result<T, WorkItemStoreError>;

/// Work item access needed by the synchroniser.
#[async_trait]
pub trait WorkItemStore: Send + Sync {
    /// Finds a work item that belongs to the given project.
    ///
    /// Returns `None` when the id is unknown or belongs to another project.
    async fn find_by_id_and_project(
        &self,
        id: WorkItemId,
        project_id: ProjectId,
    ) -> WorkItemStoreResult<Option<WorkItem>>;

    /// Overwrites the status of a work item and bumps its update timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemStoreError::NotFound`] when the work item vanished
    /// between lookup and update.
    async fn update_status(&self, id: WorkItemId, status: WorkItemStatus)
    -> WorkItemStoreResult<()>;
}

/// Errors returned by work item store implementations.
#[derive(Debug, Clone, Error)]
pub enum WorkItemStoreError {
    /// The work item was not found.
    #[error("work item not found: {0}")]
    NotFound(WorkItemId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl WorkItemStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
