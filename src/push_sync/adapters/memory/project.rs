//! In-memory project directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::push_sync::{
    domain::{Project, ProjectId},
    ports::{ProjectDirectory, ProjectDirectoryError, ProjectDirectoryResult},
};

/// Thread-safe in-memory project directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectDirectory {
    projects: Arc<RwLock<HashMap<ProjectId, Project>>>,
}

impl InMemoryProjectDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory containing the given projects.
    #[must_use]
    pub fn with_projects(projects: impl IntoIterator<Item = Project>) -> Self {
        let projects = projects
            .into_iter()
            .map(|project| (project.id(), project))
            .collect();
        Self {
            projects: Arc::new(RwLock::new(projects)),
        }
    }

    /// Registers or replaces a project.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDirectoryError::Persistence`] if the lock is poisoned.
    pub fn insert(&self, project: Project) -> ProjectDirectoryResult<()> {
        let mut projects = self.projects.write().map_err(|err| {
            ProjectDirectoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        projects.insert(project.id(), project);
        Ok(())
    }
}

#[async_trait]
impl ProjectDirectory for InMemoryProjectDirectory {
    async fn find_project(&self, id: ProjectId) -> ProjectDirectoryResult<Option<Project>> {
        let projects = self.projects.read().map_err(|err| {
            ProjectDirectoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(projects.get(&id).cloned())
    }
}
