//! Identifier and validated scalar types for the push synchronisation domain.

use super::PushSyncDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Largest identifier representable in the current `PostgreSQL` schema.
const MAX_PERSISTED_ID: u64 = i64::MAX as u64;

/// Positive identifier of a project (tenant-scoped container of work items).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(u64);

impl ProjectId {
    /// Creates a validated project identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PushSyncDomainError::InvalidProjectId`] when the value is
    /// zero or exceeds `i64::MAX`.
    pub const fn new(value: u64) -> Result<Self, PushSyncDomainError> {
        if value == 0 || value > MAX_PERSISTED_ID {
            return Err(PushSyncDomainError::InvalidProjectId(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Positive identifier of a work item, as written in commit references
/// such as `TASK-12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItemId(u64);

impl WorkItemId {
    /// Creates a validated work item identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PushSyncDomainError::InvalidWorkItemId`] when the value is
    /// zero or exceeds `i64::MAX`.
    pub const fn new(value: u64) -> Result<Self, PushSyncDomainError> {
        if value == 0 || value > MAX_PERSISTED_ID {
            return Err(PushSyncDomainError::InvalidWorkItemId(value));
        }
        Ok(Self(value))
    }

    /// Parses the digit run of a task reference token.
    ///
    /// Returns `None` for zero, overflowing, or non-numeric input; such
    /// tokens are not task references.
    #[must_use]
    pub fn parse_digits(digits: &str) -> Option<Self> {
        digits
            .parse::<u64>()
            .ok()
            .and_then(|value| Self::new(value).ok())
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an activity log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityLogId(Uuid);

impl ActivityLogId {
    /// Creates a new random activity log identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an activity log identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for ActivityLogId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActivityLogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source-control commit identifier (usually a SHA).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    /// Creates a validated commit identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PushSyncDomainError::EmptyCommitId`] when the value is empty
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, PushSyncDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(PushSyncDomainError::EmptyCommitId);
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the commit identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the abbreviated seven-character form used in log output.
    #[must_use]
    pub fn short(&self) -> &str {
        self.0
            .char_indices()
            .nth(7)
            .and_then(|(index, _)| self.0.get(..index))
            .unwrap_or(&self.0)
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
