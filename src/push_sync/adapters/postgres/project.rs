//! `PostgreSQL` project directory.

use super::{
    blocking::{PersistenceFailure, PushSyncPgPool, run_blocking},
    models::ProjectRow,
    schema::projects,
};
use crate::push_sync::{
    domain::{Project, ProjectId},
    ports::{ProjectDirectory, ProjectDirectoryError, ProjectDirectoryResult},
};
use async_trait::async_trait;
use diesel::prelude::*;

impl PersistenceFailure for ProjectDirectoryError {
    fn from_persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

/// `PostgreSQL`-backed project directory.
#[derive(Debug, Clone)]
pub struct PostgresProjectDirectory {
    pool: PushSyncPgPool,
}

impl PostgresProjectDirectory {
    /// Creates a directory from a connection pool.
    #[must_use]
    pub const fn new(pool: PushSyncPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectDirectory for PostgresProjectDirectory {
    async fn find_project(&self, id: ProjectId) -> ProjectDirectoryResult<Option<Project>> {
        let project_key = i64::try_from(id.value()).map_err(ProjectDirectoryError::persistence)?;

        run_blocking(&self.pool, move |connection| {
            let row = projects::table
                .filter(projects::id.eq(project_key))
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()
                .map_err(ProjectDirectoryError::persistence)?;
            row.map(row_to_project).transpose()
        })
        .await
    }
}

fn row_to_project(row: ProjectRow) -> ProjectDirectoryResult<Project> {
    let raw_id = u64::try_from(row.id).map_err(ProjectDirectoryError::persistence)?;
    let project_id = ProjectId::new(raw_id).map_err(ProjectDirectoryError::persistence)?;
    Ok(Project::new(project_id, row.name))
}
