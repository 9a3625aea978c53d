//! Branch name value object derived from git refs.

use super::PushSyncDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Branch name as seen by the policy gate.
///
/// Derived from a git ref by keeping its last `/`-separated segment, so
/// `refs/heads/main` becomes `main`.
///
/// # Examples
///
///     use pms_sync::push_sync::domain::BranchName;
///
///     let branch = BranchName::from_git_ref("refs/heads/main").expect("valid ref");
///     assert_eq!(branch.as_str(), "main");
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchName(String);

impl BranchName {
    /// Creates a branch name from an already-extracted name.
    ///
    /// # Errors
    ///
    /// Returns [`PushSyncDomainError::InvalidGitRef`] when the value is empty
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, PushSyncDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(PushSyncDomainError::InvalidGitRef(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Extracts the branch name from a git ref.
    ///
    /// # Errors
    ///
    /// Returns [`PushSyncDomainError::InvalidGitRef`] when the ref is empty or
    /// ends with a slash.
    pub fn from_git_ref(git_ref: &str) -> Result<Self, PushSyncDomainError> {
        let last_segment = git_ref.trim().rsplit('/').next().unwrap_or_default();
        if last_segment.is_empty() {
            return Err(PushSyncDomainError::InvalidGitRef(git_ref.to_owned()));
        }
        Ok(Self(last_segment.to_owned()))
    }

    /// Returns the branch name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
