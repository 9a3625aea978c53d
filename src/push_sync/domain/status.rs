//! Canonical work item statuses and the keyword resolution table.

use super::{ParseWorkItemStatusError, PushSyncDomainError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Canonical work item lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemStatus {
    /// Work has not started.
    Pending,
    /// Work is under way.
    InProgress,
    /// Work is finished.
    Completed,
}

impl WorkItemStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for WorkItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for WorkItemStatus {
    type Error = ParseWorkItemStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseWorkItemStatusError(value.to_owned())),
        }
    }
}

/// Keywords recognised when no table is configured.
const DEFAULT_KEYWORDS: [(&str, WorkItemStatus); 6] = [
    ("pending", WorkItemStatus::Pending),
    ("start", WorkItemStatus::InProgress),
    ("inprogress", WorkItemStatus::InProgress),
    ("done", WorkItemStatus::Completed),
    ("complete", WorkItemStatus::Completed),
    ("closed", WorkItemStatus::Completed),
];

/// Case-insensitive mapping from commit keywords to canonical statuses.
///
/// The table is total only over its own keywords: anything else resolves to
/// `None`, which callers treat as "ignore this keyword".
///
/// # Examples
///
///     use pms_sync::push_sync::domain::{StatusTable, WorkItemStatus};
///
///     let table = StatusTable::default();
///     assert_eq!(table.resolve("DONE"), Some(WorkItemStatus::Completed));
///     assert_eq!(table.resolve("shipped"), None);
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTable {
    entries: BTreeMap<String, WorkItemStatus>,
}

impl StatusTable {
    /// Builds a table from keyword/status pairs.
    ///
    /// Keywords are trimmed and lower-cased. Later duplicates overwrite
    /// earlier ones.
    ///
    /// # Errors
    ///
    /// Returns [`PushSyncDomainError::EmptyKeywordTable`] when no keyword is
    /// supplied, or [`PushSyncDomainError::InvalidKeyword`] when a keyword is
    /// not made of ASCII letters and underscores (the explicit annotation
    /// grammar could never match it).
    pub fn new<K>(
        entries: impl IntoIterator<Item = (K, WorkItemStatus)>,
    ) -> Result<Self, PushSyncDomainError>
    where
        K: AsRef<str>,
    {
        let mut table = BTreeMap::new();
        for (keyword, status) in entries {
            let normalized = keyword.as_ref().trim().to_ascii_lowercase();
            if normalized.is_empty()
                || !normalized
                    .chars()
                    .all(|character| character.is_ascii_alphabetic() || character == '_')
            {
                return Err(PushSyncDomainError::InvalidKeyword(
                    keyword.as_ref().to_owned(),
                ));
            }
            table.insert(normalized, status);
        }

        if table.is_empty() {
            return Err(PushSyncDomainError::EmptyKeywordTable);
        }
        Ok(Self { entries: table })
    }

    /// Resolves a keyword to its canonical status.
    #[must_use]
    pub fn resolve(&self, keyword: &str) -> Option<WorkItemStatus> {
        self.entries
            .get(keyword.trim().to_ascii_lowercase().as_str())
            .copied()
    }

    /// Returns the recognised keywords in lexical order.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for StatusTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_KEYWORDS
                .iter()
                .map(|(keyword, status)| ((*keyword).to_owned(), *status))
                .collect(),
        }
    }
}
