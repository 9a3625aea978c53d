//! Shared world state for push synchronisation BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use pms_sync::push_sync::{
    adapters::memory::{InMemoryActivityLog, InMemoryProjectDirectory, InMemoryWorkItemStore},
    domain::{BranchPolicyKind, StatusTable},
    services::{PushSyncOutcome, PushSyncResult, PushSyncService, SyncSettings},
};
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestPushSyncService = PushSyncService<
    InMemoryWorkItemStore,
    InMemoryActivityLog,
    InMemoryProjectDirectory,
    DefaultClock,
>;

/// Scenario world for push synchronisation behaviour tests.
pub struct PushSyncWorld {
    pub service: TestPushSyncService,
    pub work_items: Arc<InMemoryWorkItemStore>,
    pub activity_log: Arc<InMemoryActivityLog>,
    pub projects: Arc<InMemoryProjectDirectory>,
    pub last_result: Option<PushSyncResult<PushSyncOutcome>>,
}

impl PushSyncWorld {
    /// Creates a world with empty stores and the tiered branch policy.
    ///
    /// # Panics
    ///
    /// Panics if the default keyword table fails to compile.
    #[must_use]
    pub fn new() -> Self {
        let work_items = Arc::new(InMemoryWorkItemStore::new());
        let activity_log = Arc::new(InMemoryActivityLog::new());
        let projects = Arc::new(InMemoryProjectDirectory::new());
        let settings = SyncSettings::new(StatusTable::default(), BranchPolicyKind::Tiered)
            .expect("default synchronisation settings compile");
        let service = PushSyncService::new(
            Arc::clone(&work_items),
            Arc::clone(&activity_log),
            Arc::clone(&projects),
            Arc::new(DefaultClock),
            settings,
        );

        Self {
            service,
            work_items,
            activity_log,
            projects,
            last_result: None,
        }
    }
}

impl Default for PushSyncWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> PushSyncWorld {
    PushSyncWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
