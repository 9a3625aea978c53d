//! `PostgreSQL` activity log.

use super::{
    blocking::{PersistenceFailure, PushSyncPgPool, run_blocking},
    models::{ActivityLogRow, NewActivityLogRow},
    schema::project_activity_logs,
};
use crate::push_sync::{
    domain::{ActivityLogEntry, ActivityLogId, ActivityPayload, ProjectId},
    ports::{ActivityLogError, ActivityLogHistory, ActivityLogResult, ActivityLogSink},
};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

impl PersistenceFailure for ActivityLogError {
    fn from_persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

/// `PostgreSQL`-backed activity log.
#[derive(Debug, Clone)]
pub struct PostgresActivityLog {
    pool: PushSyncPgPool,
}

impl PostgresActivityLog {
    /// Creates an activity log from a connection pool.
    #[must_use]
    pub const fn new(pool: PushSyncPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityLogSink for PostgresActivityLog {
    async fn append(&self, entry: &ActivityLogEntry) -> ActivityLogResult<ActivityLogId> {
        let entry_id = entry.id();
        let new_row = to_new_row(entry)?;

        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(project_activity_logs::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        ActivityLogError::DuplicateEntry(entry_id)
                    }
                    _ => ActivityLogError::persistence(err),
                })?;
            Ok(entry_id)
        })
        .await
    }
}

#[async_trait]
impl ActivityLogHistory for PostgresActivityLog {
    async fn list_for_project(
        &self,
        project_id: ProjectId,
    ) -> ActivityLogResult<Vec<ActivityLogEntry>> {
        let project_key = i64::try_from(project_id.value()).map_err(ActivityLogError::persistence)?;

        run_blocking(&self.pool, move |connection| {
            let rows = project_activity_logs::table
                .filter(project_activity_logs::project_id.eq(project_key))
                .order(project_activity_logs::created_at.desc())
                .select(ActivityLogRow::as_select())
                .load::<ActivityLogRow>(connection)
                .map_err(ActivityLogError::persistence)?;
            rows.into_iter().map(row_to_entry).collect()
        })
        .await
    }
}

fn to_new_row(entry: &ActivityLogEntry) -> ActivityLogResult<NewActivityLogRow> {
    let project_id =
        i64::try_from(entry.project_id().value()).map_err(ActivityLogError::persistence)?;
    let activity =
        serde_json::to_value(entry.payload()).map_err(ActivityLogError::persistence)?;

    Ok(NewActivityLogRow {
        id: entry.id().into_inner(),
        project_id,
        activity,
        created_at: entry.created_at(),
    })
}

fn row_to_entry(row: ActivityLogRow) -> ActivityLogResult<ActivityLogEntry> {
    let raw_project_id = u64::try_from(row.project_id).map_err(ActivityLogError::persistence)?;
    let project_id = ProjectId::new(raw_project_id).map_err(ActivityLogError::persistence)?;
    let payload = serde_json::from_value::<ActivityPayload>(row.activity)
        .map_err(ActivityLogError::persistence)?;
    Ok(ActivityLogEntry::from_persisted(
        ActivityLogId::from_uuid(row.id),
        project_id,
        payload,
        row.created_at,
    ))
}
