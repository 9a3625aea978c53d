//! Webhook and activity log handlers.

use super::{
    error::{ApiError, ApiResult},
    state::AppState,
};
use crate::push_sync::{
    domain::{ActivityLogId, ActivityPayload, ProjectId, StatusChange},
    ports::{ActivityLogHistory, ActivityLogSink, ProjectDirectory, WorkItemStore},
    services::PushSyncOutcome,
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;

/// Body returned by the push webhook.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PushEventResponse {
    /// The push was processed.
    Success {
        /// Project name.
        project: String,
        /// Target branch.
        branch: String,
        /// Applied changes in commit order.
        updated_work_items: Vec<StatusChange>,
        /// Identifier of the activity entry written for the push.
        activity_log_id: ActivityLogId,
    },
    /// The push was accepted without processing.
    Ignored {
        /// Why nothing was processed.
        message: String,
        /// Entry written anyway, when configured.
        #[serde(skip_serializing_if = "Option::is_none")]
        activity_log_id: Option<ActivityLogId>,
    },
}

impl From<PushSyncOutcome> for PushEventResponse {
    fn from(outcome: PushSyncOutcome) -> Self {
        match outcome {
            PushSyncOutcome::Ignored {
                reason,
                log_entry_id,
                ..
            } => Self::Ignored {
                message: reason.message().to_owned(),
                activity_log_id: log_entry_id,
            },
            PushSyncOutcome::Synchronized(report) => Self::Success {
                project: report.project().name().to_owned(),
                branch: report.branch().to_string(),
                updated_work_items: report.changes().to_vec(),
                activity_log_id: report.log_entry().id(),
            },
        }
    }
}

/// One activity log entry as listed over HTTP.
#[derive(Debug, Serialize)]
pub struct ActivityLogResponse {
    /// Entry identifier.
    pub id: ActivityLogId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Recorded payload.
    pub activity: ActivityPayload,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Liveness check.
pub async fn health_check() -> &'static str {
    "ok"
}

/// Receives a source-control push for a project.
///
/// # Errors
///
/// Returns [`ApiError::BadRequest`] for malformed payloads,
/// [`ApiError::NotFound`] for unknown projects and [`ApiError::Internal`] when
/// storage fails.
pub async fn post_push_event<W, L, P, C>(
    State(state): State<AppState<W, L, P, C>>,
    Path(raw_project_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<PushEventResponse>>
where
    W: WorkItemStore + 'static,
    L: ActivityLogSink + ActivityLogHistory + 'static,
    P: ProjectDirectory + 'static,
    C: Clock + Send + Sync + 'static,
{
    let project_id = parse_project_id(&raw_project_id)?;
    tracing::info!(project_id = %project_id, bytes = body.len(), "push webhook received");
    let outcome = state.service.synchronize_payload(project_id, &body).await?;
    Ok(Json(outcome.into()))
}

/// Lists the activity entries of a project, newest first.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] for unknown projects and
/// [`ApiError::Internal`] when storage fails.
pub async fn list_project_activity<W, L, P, C>(
    State(state): State<AppState<W, L, P, C>>,
    Path(raw_project_id): Path<String>,
) -> ApiResult<Json<Vec<ActivityLogResponse>>>
where
    W: WorkItemStore + 'static,
    L: ActivityLogSink + ActivityLogHistory + 'static,
    P: ProjectDirectory + 'static,
    C: Clock + Send + Sync + 'static,
{
    let project_id = parse_project_id(&raw_project_id)?;
    let entries = state.service.activity_for_project(project_id).await?;
    Ok(Json(
        entries
            .into_iter()
            .map(|entry| ActivityLogResponse {
                id: entry.id(),
                project_id: entry.project_id(),
                activity: entry.payload().clone(),
                created_at: entry.created_at(),
            })
            .collect(),
    ))
}

/// Resolves a path segment to a project id.
///
/// Segments that are not positive integers cannot name a project, so they
/// answer like any other unknown project.
fn parse_project_id(raw: &str) -> ApiResult<ProjectId> {
    raw.parse::<u64>()
        .ok()
        .and_then(|value| ProjectId::new(value).ok())
        .ok_or_else(|| ApiError::NotFound("Project not found".to_owned()))
}
