//! Diesel row models for push synchronisation persistence.

use super::schema::{project_activity_logs, projects, work_items};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for projects.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    /// Project identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
}

/// Query result row for the synchroniser's view of a work item.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = work_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WorkItemRow {
    /// Work item identifier.
    pub id: i64,
    /// Work item title.
    pub title: String,
    /// Canonical status.
    pub status: String,
}

/// Query result row for activity log entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = project_activity_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActivityLogRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: i64,
    /// Activity payload document.
    pub activity: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for activity log entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = project_activity_logs)]
pub struct NewActivityLogRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: i64,
    /// Activity payload document.
    pub activity: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
