//! Domain model for commit-driven work item synchronisation.
//!
//! Everything here is pure: reference extraction, keyword resolution and
//! branch gating never fail and never touch storage. Infrastructure stays on
//! the far side of the [`ports`](super::ports) boundary.

mod activity;
mod branch;
mod error;
mod ids;
mod policy;
mod push;
mod reference;
mod status;
mod work_item;

pub use activity::{ActivityLogEntry, ActivityPayload, PUSH_EVENT_TYPE, StatusChange};
pub use branch::BranchName;
pub use error::{ParseWorkItemStatusError, PushPayloadError, PushSyncDomainError};
pub use ids::{ActivityLogId, CommitId, ProjectId, WorkItemId};
pub use policy::{BranchPolicy, BranchPolicyKind, CompletionGatedBranchPolicy, TieredBranchPolicy};
pub use push::{Commit, PushEvent};
pub use reference::{ExtractedReferences, ReferenceGrammar, TaskReference};
pub use status::{StatusTable, WorkItemStatus};
pub use work_item::{Project, WorkItem};
