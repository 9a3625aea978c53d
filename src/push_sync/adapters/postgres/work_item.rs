//! `PostgreSQL` work item store.

use super::{
    blocking::{PersistenceFailure, PushSyncPgPool, run_blocking},
    models::WorkItemRow,
    schema::work_items,
};
use crate::push_sync::{
    domain::{ProjectId, WorkItem, WorkItemId, WorkItemStatus},
    ports::{WorkItemStore, WorkItemStoreError, WorkItemStoreResult},
};
use async_trait::async_trait;
use diesel::prelude::*;

impl PersistenceFailure for WorkItemStoreError {
    fn from_persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

/// `PostgreSQL`-backed work item store.
#[derive(Debug, Clone)]
pub struct PostgresWorkItemStore {
    pool: PushSyncPgPool,
}

impl PostgresWorkItemStore {
    /// Creates a store from a connection pool.
    #[must_use]
    pub const fn new(pool: PushSyncPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkItemStore for PostgresWorkItemStore {
    async fn find_by_id_and_project(
        &self,
        id: WorkItemId,
        project_id: ProjectId,
    ) -> WorkItemStoreResult<Option<WorkItem>> {
        let item_key = i64::try_from(id.value()).map_err(WorkItemStoreError::persistence)?;
        let project_key =
            i64::try_from(project_id.value()).map_err(WorkItemStoreError::persistence)?;

        run_blocking(&self.pool, move |connection| {
            let row = work_items::table
                .filter(work_items::id.eq(item_key))
                .filter(work_items::project_id.eq(project_key))
                .select(WorkItemRow::as_select())
                .first::<WorkItemRow>(connection)
                .optional()
                .map_err(WorkItemStoreError::persistence)?;
            row.map(|found| row_to_work_item(found, project_id))
                .transpose()
        })
        .await
    }

    async fn update_status(
        &self,
        id: WorkItemId,
        status: WorkItemStatus,
    ) -> WorkItemStoreResult<()> {
        let item_key = i64::try_from(id.value()).map_err(WorkItemStoreError::persistence)?;

        run_blocking(&self.pool, move |connection| {
            let updated = diesel::update(work_items::table.filter(work_items::id.eq(item_key)))
                .set((
                    work_items::status.eq(status.as_str()),
                    work_items::updated_at.eq(diesel::dsl::now),
                ))
                .execute(connection)
                .map_err(WorkItemStoreError::persistence)?;
            if updated == 0 {
                return Err(WorkItemStoreError::NotFound(id));
            }
            Ok(())
        })
        .await
    }
}

fn row_to_work_item(row: WorkItemRow, project_id: ProjectId) -> WorkItemStoreResult<WorkItem> {
    let WorkItemRow {
        id,
        title,
        status: persisted_status,
    } = row;

    let raw_id = u64::try_from(id).map_err(WorkItemStoreError::persistence)?;
    let work_item_id = WorkItemId::new(raw_id).map_err(WorkItemStoreError::persistence)?;
    let status = WorkItemStatus::try_from(persisted_status.as_str())
        .map_err(WorkItemStoreError::persistence)?;
    Ok(WorkItem::new(work_item_id, project_id, title, status))
}
