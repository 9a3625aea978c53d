//! Shared state for HTTP handlers.

use crate::push_sync::{
    ports::{ActivityLogHistory, ActivityLogSink, ProjectDirectory, WorkItemStore},
    services::PushSyncService,
};
use mockable::Clock;

/// Application state handed to every handler.
pub struct AppState<W, L, P, C>
where
    W: WorkItemStore,
    L: ActivityLogSink + ActivityLogHistory,
    P: ProjectDirectory,
    C: Clock + Send + Sync,
{
    /// Synchronisation engine.
    pub service: PushSyncService<W, L, P, C>,
}

impl<W, L, P, C> AppState<W, L, P, C>
where
    W: WorkItemStore,
    L: ActivityLogSink + ActivityLogHistory,
    P: ProjectDirectory,
    C: Clock + Send + Sync,
{
    /// Creates application state around a configured service.
    #[must_use]
    pub const fn new(service: PushSyncService<W, L, P, C>) -> Self {
        Self { service }
    }
}

impl<W, L, P, C> Clone for AppState<W, L, P, C>
where
    W: WorkItemStore,
    L: ActivityLogSink + ActivityLogHistory,
    P: ProjectDirectory,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}
