//! In-memory work item store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::push_sync::{
    domain::{ProjectId, WorkItem, WorkItemId, WorkItemStatus},
    ports::{WorkItemStore, WorkItemStoreError, WorkItemStoreResult},
};

/// Thread-safe in-memory work item store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkItemStore {
    items: Arc<RwLock<HashMap<WorkItemId, WorkItem>>>,
}

impl InMemoryWorkItemStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the given work items.
    #[must_use]
    pub fn with_items(items: impl IntoIterator<Item = WorkItem>) -> Self {
        let items = items.into_iter().map(|item| (item.id(), item)).collect();
        Self {
            items: Arc::new(RwLock::new(items)),
        }
    }

    /// Inserts or replaces a work item.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemStoreError::Persistence`] if the lock is poisoned.
    pub fn insert(&self, item: WorkItem) -> WorkItemStoreResult<()> {
        let mut items = self.items.write().map_err(|err| {
            WorkItemStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        items.insert(item.id(), item);
        Ok(())
    }

    /// Returns a work item regardless of project.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemStoreError::Persistence`] if the lock is poisoned.
    pub fn get(&self, id: WorkItemId) -> WorkItemStoreResult<Option<WorkItem>> {
        let items = self.items.read().map_err(|err| {
            WorkItemStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(items.get(&id).cloned())
    }
}

#[async_trait]
impl WorkItemStore for InMemoryWorkItemStore {
    async fn find_by_id_and_project(
        &self,
        id: WorkItemId,
        project_id: ProjectId,
    ) -> WorkItemStoreResult<Option<WorkItem>> {
        let items = self.items.read().map_err(|err| {
            WorkItemStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(items
            .get(&id)
            .filter(|item| item.project_id() == project_id)
            .cloned())
    }

    async fn update_status(
        &self,
        id: WorkItemId,
        status: WorkItemStatus,
    ) -> WorkItemStoreResult<()> {
        let mut items = self.items.write().map_err(|err| {
            WorkItemStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let current = items.get(&id).ok_or(WorkItemStoreError::NotFound(id))?;
        let updated = WorkItem::new(id, current.project_id(), current.title(), status);
        items.insert(id, updated);
        Ok(())
    }
}
