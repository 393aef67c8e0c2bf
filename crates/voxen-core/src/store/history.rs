// ── History store ──
//
// Holds the run history in chronological order. The list is replaced
// wholesale on fetch and only shrinks locally after the backend has
// acknowledged a delete or clear.

use std::sync::Arc;

use tracing::{debug, info, warn};
use voxen_api::{CommandGateway, HistoryItem};

use crate::error::CoreError;
use crate::notify::{NotificationKind, Notifier};
use crate::store::Slot;
use crate::stream::StateStream;

pub struct HistoryStore {
    gateway: Arc<dyn CommandGateway>,
    notifier: Arc<Notifier>,
    items: Slot<Vec<HistoryItem>>,
}

impl HistoryStore {
    pub(crate) fn new(gateway: Arc<dyn CommandGateway>, notifier: Arc<Notifier>) -> Self {
        Self {
            gateway,
            notifier,
            items: Slot::new(Vec::new()),
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Items in chronological (insertion) order.
    pub fn snapshot(&self) -> Arc<Vec<HistoryItem>> {
        self.items.get()
    }

    /// Items most-recent-first, the order they are shown in.
    pub fn display(&self) -> Vec<HistoryItem> {
        self.items.get().iter().rev().cloned().collect()
    }

    /// The `n` most recent items, most-recent-first.
    pub fn recent(&self, n: usize) -> Vec<HistoryItem> {
        self.items.get().iter().rev().take(n).cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<HistoryItem> {
        self.items.get().iter().find(|item| item.id == id).cloned()
    }

    /// Like [`get`](Self::get), but a miss is an error.
    pub fn require(&self, id: &str) -> Result<HistoryItem, CoreError> {
        self.get(id)
            .ok_or_else(|| CoreError::HistoryItemNotFound { id: id.to_owned() })
    }

    pub fn len(&self) -> usize {
        self.items.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.get().is_empty()
    }

    pub fn subscribe(&self) -> StateStream<Vec<HistoryItem>> {
        self.items.subscribe()
    }

    // ── Gateway-backed operations ────────────────────────────────────

    /// Replace the list with the backend's. On failure the previous list
    /// is kept and the error is only logged.
    pub async fn fetch(&self) -> Result<(), CoreError> {
        match self.gateway.get_history().await {
            Ok(items) => {
                debug!(count = items.len(), "history fetched");
                self.items.set(items);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch history");
                Err(e.into())
            }
        }
    }

    /// Delete one item. The local list changes only after the backend
    /// acknowledges; on failure it is left exactly as it was.
    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        if let Err(e) = self.gateway.delete_history_item(id).await {
            warn!(error = %e, id, "failed to delete history item");
            self.notifier.raise(
                NotificationKind::MutationFailed,
                format!("Could not delete history item: {e}"),
            );
            return Err(e.into());
        }

        self.items.update(|items| items.retain(|item| item.id != id));
        info!(id, "history item deleted");
        Ok(())
    }

    /// Remove every item once the backend acknowledges.
    pub async fn clear(&self) -> Result<(), CoreError> {
        if let Err(e) = self.gateway.clear_history().await {
            warn!(error = %e, "failed to clear history");
            self.notifier.raise(
                NotificationKind::MutationFailed,
                format!("Could not clear history: {e}"),
            );
            return Err(e.into());
        }

        self.items.set(Vec::new());
        info!("history cleared");
        Ok(())
    }
}
