//! Per-work-item write serialisation.

use crate::push_sync::domain::WorkItemId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of async locks keyed by work item.
///
/// Slots are created on demand and removed once nobody holds or awaits them,
/// so the registry only grows with the number of concurrently touched items.
#[derive(Debug, Default)]
pub(crate) struct WorkItemLocks {
    slots: Mutex<HashMap<WorkItemId, Arc<AsyncMutex<()>>>>,
}

impl WorkItemLocks {
    /// Waits until the caller is the only writer for `id`.
    pub(crate) async fn acquire(&self, id: WorkItemId) -> WorkItemGuard<'_> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(id).or_default())
        };
        let guard = Arc::clone(&slot).lock_owned().await;
        WorkItemGuard {
            locks: self,
            id,
            slot,
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Exclusive access to one work item; released on drop.
pub(crate) struct WorkItemGuard<'a> {
    locks: &'a WorkItemLocks,
    id: WorkItemId,
    slot: Arc<AsyncMutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for WorkItemGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut slots = self
            .locks
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // One reference in the registry plus ours: nobody else is waiting.
        if Arc::strong_count(&self.slot) == 2 {
            slots.remove(&self.id);
        }
    }
}
