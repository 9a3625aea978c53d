//! Port contracts for push synchronisation.
//!
//! Ports define infrastructure-agnostic interfaces used by the push
//! synchronisation service.

pub mod activity_log;
pub mod project;
pub mod work_item;

pub use activity_log::{ActivityLogError, ActivityLogHistory, ActivityLogResult, ActivityLogSink};
pub use project::{ProjectDirectory, ProjectDirectoryError, ProjectDirectoryResult};
pub use work_item::{WorkItemStore, WorkItemStoreError, WorkItemStoreResult};
