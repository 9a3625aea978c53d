//! Branch policy gate deciding which statuses a push may apply.

use super::{BranchName, WorkItemStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Branches treated as the release line.
const RELEASE_BRANCHES: [&str; 3] = ["main", "master", "production"];

/// Branches treated as the integration line by [`TieredBranchPolicy`].
const INTEGRATION_BRANCHES: [&str; 2] = ["development", "dev"];

/// Prefix identifying feature branches in [`TieredBranchPolicy`].
const FEATURE_PREFIX: &str = "feature";

/// Decides whether a status may be applied from a push to a branch.
///
/// Implementations must be pure.
pub trait BranchPolicy: Send + Sync + fmt::Debug {
    /// Returns `true` when `status` may be applied from `branch`.
    fn is_allowed(&self, branch: &BranchName, status: WorkItemStatus) -> bool;
}

/// Each branch family may only move work items to its own stage.
///
/// | branch                          | allowed                       |
/// |---------------------------------|-------------------------------|
/// | `feature*`                      | `pending`, `in_progress`      |
/// | `development`, `dev`            | `in_progress`                 |
/// | `main`, `master`, `production`  | `completed`                   |
/// | anything else                   | everything                    |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TieredBranchPolicy;

impl BranchPolicy for TieredBranchPolicy {
    fn is_allowed(&self, branch: &BranchName, status: WorkItemStatus) -> bool {
        let name = branch.as_str();
        if name.starts_with(FEATURE_PREFIX) {
            return matches!(
                status,
                WorkItemStatus::Pending | WorkItemStatus::InProgress
            );
        }
        if INTEGRATION_BRANCHES.contains(&name) {
            return status == WorkItemStatus::InProgress;
        }
        if RELEASE_BRANCHES.contains(&name) {
            return status == WorkItemStatus::Completed;
        }
        true
    }
}

/// Only the release line may complete work items; every branch may start them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionGatedBranchPolicy;

impl BranchPolicy for CompletionGatedBranchPolicy {
    fn is_allowed(&self, branch: &BranchName, status: WorkItemStatus) -> bool {
        match status {
            WorkItemStatus::Completed => RELEASE_BRANCHES.contains(&branch.as_str()),
            WorkItemStatus::Pending | WorkItemStatus::InProgress => true,
        }
    }
}

/// Configuration selector for the active branch policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchPolicyKind {
    /// [`TieredBranchPolicy`].
    #[default]
    Tiered,
    /// [`CompletionGatedBranchPolicy`].
    CompletionGated,
}

impl BranchPolicyKind {
    /// Returns the configuration name of the policy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tiered => "tiered",
            Self::CompletionGated => "completion_gated",
        }
    }
}

impl fmt::Display for BranchPolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BranchPolicy for BranchPolicyKind {
    fn is_allowed(&self, branch: &BranchName, status: WorkItemStatus) -> bool {
        match self {
            Self::Tiered => TieredBranchPolicy.is_allowed(branch, status),
            Self::CompletionGated => CompletionGatedBranchPolicy.is_allowed(branch, status),
        }
    }
}
