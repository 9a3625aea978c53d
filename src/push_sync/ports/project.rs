//! Project lookup port.

use crate::push_sync::domain::{Project, ProjectId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for project lookups.
pub type ProjectDirectoryResult<T> = Result<T, ProjectDirectoryError>;

/// Resolves project identifiers carried in webhook URLs.
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    /// Finds a project by identifier, returning `None` when it does not exist.
    async fn find_project(&self, id: ProjectId) -> ProjectDirectoryResult<Option<Project>>;
}

/// Errors returned by project directory implementations.
#[derive(Debug, Clone, Error)]
pub enum ProjectDirectoryError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProjectDirectoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
