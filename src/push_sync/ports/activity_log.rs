//! Append-only activity log ports.

use crate::push_sync::domain::{ActivityLogEntry, ActivityLogId, ProjectId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for activity log operations.
pub type ActivityLogResult<T> = Result<T, ActivityLogError>;

/// Write side of the activity log.
#[async_trait]
pub trait ActivityLogSink: Send + Sync {
    /// Appends an entry and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityLogError::DuplicateEntry`] when the identifier is
    /// already present; entries are never overwritten.
    async fn append(&self, entry: &ActivityLogEntry) -> ActivityLogResult<ActivityLogId>;
}

/// Read side of the activity log.
#[async_trait]
pub trait ActivityLogHistory: Send + Sync {
    /// Lists entries of a project, newest first.
    async fn list_for_project(
        &self,
        project_id: ProjectId,
    ) -> ActivityLogResult<Vec<ActivityLogEntry>>;
}

/// Errors returned by activity log implementations.
#[derive(Debug, Clone, Error)]
pub enum ActivityLogError {
    /// An entry with the same identifier already exists.
    #[error("duplicate activity log entry: {0}")]
    DuplicateEntry(ActivityLogId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ActivityLogError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
