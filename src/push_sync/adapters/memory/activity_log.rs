//! In-memory activity log.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::push_sync::{
    domain::{ActivityLogEntry, ActivityLogId, ProjectId},
    ports::{ActivityLogError, ActivityLogHistory, ActivityLogResult, ActivityLogSink},
};

/// Thread-safe in-memory activity log preserving append order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryActivityLog {
    entries: Arc<RwLock<Vec<ActivityLogEntry>>>,
}

impl InMemoryActivityLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every entry in append order.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityLogError::Persistence`] if the lock is poisoned.
    pub fn entries(&self) -> ActivityLogResult<Vec<ActivityLogEntry>> {
        let entries = self.entries.read().map_err(|err| {
            ActivityLogError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(entries.clone())
    }
}

#[async_trait]
impl ActivityLogSink for InMemoryActivityLog {
    async fn append(&self, entry: &ActivityLogEntry) -> ActivityLogResult<ActivityLogId> {
        let mut entries = self.entries.write().map_err(|err| {
            ActivityLogError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if entries.iter().any(|existing| existing.id() == entry.id()) {
            return Err(ActivityLogError::DuplicateEntry(entry.id()));
        }
        entries.push(entry.clone());
        Ok(entry.id())
    }
}

#[async_trait]
impl ActivityLogHistory for InMemoryActivityLog {
    async fn list_for_project(
        &self,
        project_id: ProjectId,
    ) -> ActivityLogResult<Vec<ActivityLogEntry>> {
        let entries = self.entries.read().map_err(|err| {
            ActivityLogError::persistence(std::io::Error::other(err.to_string()))
        })?;
        // Reverse append order keeps entries with equal timestamps newest first.
        Ok(entries
            .iter()
            .rev()
            .filter(|entry| entry.project_id() == project_id)
            .cloned()
            .collect())
    }
}
