//! Route table.

use super::{handlers, state::AppState};
use crate::push_sync::ports::{ActivityLogHistory, ActivityLogSink, ProjectDirectory, WorkItemStore};
use axum::{
    Router,
    routing::{get, post},
};
use mockable::Clock;
use tower_http::trace::TraceLayer;

/// Builds the application router.
pub fn create_router<W, L, P, C>(state: AppState<W, L, P, C>) -> Router
where
    W: WorkItemStore + 'static,
    L: ActivityLogSink + ActivityLogHistory + 'static,
    P: ProjectDirectory + 'static,
    C: Clock + Send + Sync + 'static,
{
    let api_routes = Router::new()
        .route(
            "/project-activity-logs/:project_id/post-push-event",
            post(handlers::post_push_event::<W, L, P, C>),
        )
        .route(
            "/project-activity-logs/by-project/:project_id",
            get(handlers::list_project_activity::<W, L, P, C>),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
