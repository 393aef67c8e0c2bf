// ── Reactive value slot ──
//
// A single watched value with whole-value assignment. Every write swaps
// in a complete new `Arc<T>`, so readers never observe a partial update.

use std::sync::Arc;

use tokio::sync::watch;

use crate::stream::StateStream;

pub(crate) struct Slot<T: Send + Sync + 'static> {
    tx: watch::Sender<Arc<T>>,
}

impl<T: Send + Sync + 'static> Slot<T> {
    pub(crate) fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(Arc::new(initial));
        Self { tx }
    }

    /// Current value (cheap `Arc` clone).
    pub(crate) fn get(&self) -> Arc<T> {
        self.tx.borrow().clone()
    }

    /// Replace the value and notify subscribers.
    pub(crate) fn set(&self, value: T) {
        // `send_modify` updates unconditionally, even with zero receivers.
        self.tx.send_modify(|slot| *slot = Arc::new(value));
    }

    pub(crate) fn subscribe(&self) -> StateStream<T> {
        StateStream::new(self.tx.subscribe())
    }
}

impl<T: Clone + Send + Sync + 'static> Slot<T> {
    /// Derive a new value from the current one and store it.
    pub(crate) fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(|slot| {
            let mut next = T::clone(slot);
            f(&mut next);
            *slot = Arc::new(next);
        });
    }
}
