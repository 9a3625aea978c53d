//! Application services for push synchronisation.

mod locks;
mod synchronizer;

pub use synchronizer::{
    IgnoreReason, PushSyncError, PushSyncErrorKind, PushSyncOutcome, PushSyncReport,
    PushSyncResult, PushSyncService, SyncSettings,
};
