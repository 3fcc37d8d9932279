//! Counter of in-flight API calls for progress indicators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

/// Emitted on every change of a [`PendingOperations`] counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingOperationEvent {
    /// A call started; `pending` is the count after the increment.
    Added { pending: usize },
    /// A call finished (successfully or not); `pending` is the count after the decrement.
    Removed { pending: usize },
}

impl PendingOperationEvent {
    pub fn pending(self) -> usize {
        match self {
            Self::Added { pending } | Self::Removed { pending } => pending,
        }
    }
}

/// Atomic count of API calls currently in flight.
///
/// Clients share [`PendingOperations::global`] unless the builder is given a private counter.
#[derive(Debug)]
pub struct PendingOperations {
    count: AtomicUsize,
    events: broadcast::Sender<PendingOperationEvent>,
}

impl Default for PendingOperations {
    fn default() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            count: AtomicUsize::new(0),
            events,
        }
    }
}

impl PendingOperations {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Process-wide counter.
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<PendingOperations>> = OnceLock::new();
        GLOBAL.get_or_init(PendingOperations::new).clone()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PendingOperationEvent> {
        self.events.subscribe()
    }

    /// Count one operation until the returned guard is dropped.
    pub(crate) fn begin(self: &Arc<Self>) -> PendingOperationGuard {
        let pending = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        // No receivers is fine.
        let _ = self.events.send(PendingOperationEvent::Added { pending });
        PendingOperationGuard {
            operations: Arc::clone(self),
        }
    }
}

#[must_use = "the operation is uncounted as soon as the guard drops"]
pub(crate) struct PendingOperationGuard {
    operations: Arc<PendingOperations>,
}

impl Drop for PendingOperationGuard {
    fn drop(&mut self) {
        let pending = self.operations.count.fetch_sub(1, Ordering::SeqCst) - 1;
        let _ = self
            .operations
            .events
            .send(PendingOperationEvent::Removed { pending });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_counts_up_and_down_with_events() {
        let operations = PendingOperations::new();
        let mut events = operations.subscribe();

        let first = operations.begin();
        let second = operations.begin();
        assert_eq!(operations.count(), 2);
        drop(first);
        drop(second);
        assert_eq!(operations.count(), 0);

        assert_eq!(events.try_recv().unwrap(), PendingOperationEvent::Added { pending: 1 });
        assert_eq!(events.try_recv().unwrap(), PendingOperationEvent::Added { pending: 2 });
        assert_eq!(events.try_recv().unwrap(), PendingOperationEvent::Removed { pending: 1 });
        assert_eq!(events.try_recv().unwrap(), PendingOperationEvent::Removed { pending: 0 });
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn global_counter_is_shared() {
        assert!(Arc::ptr_eq(
            &PendingOperations::global(),
            &PendingOperations::global()
        ));
    }
}
