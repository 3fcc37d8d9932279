//! Single-winner gate for reauthentication after a 403.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

/// First caller to [`try_acquire`](Self::try_acquire) wins; everyone else waits until the
/// winner's guard is dropped.
#[derive(Debug)]
pub(crate) struct ReauthenticationGate {
    in_progress: AtomicBool,
    completed: watch::Sender<u64>,
}

impl Default for ReauthenticationGate {
    fn default() -> Self {
        let (completed, _) = watch::channel(0);
        Self {
            in_progress: AtomicBool::new(false),
            completed,
        }
    }
}

impl ReauthenticationGate {
    /// Take a completion ticket before trying the gate so a release between the failed
    /// acquire and the wait is not missed.
    pub(crate) fn ticket(&self) -> watch::Receiver<u64> {
        self.completed.subscribe()
    }

    pub(crate) fn try_acquire(&self) -> Option<ReauthenticationGuard<'_>> {
        self.in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| ReauthenticationGuard { gate: self })
    }

    pub(crate) fn is_in_progress(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    /// Number of attempts released so far.
    pub(crate) fn completed(&self) -> u64 {
        *self.completed.borrow()
    }

    /// Wait for the attempt in flight (if any) to be released.
    pub(crate) async fn wait(&self, mut ticket: watch::Receiver<u64>) {
        while self.is_in_progress() {
            if ticket.changed().await.is_err() {
                return;
            }
        }
    }
}

pub(crate) struct ReauthenticationGuard<'a> {
    gate: &'a ReauthenticationGate,
}

impl Drop for ReauthenticationGuard<'_> {
    fn drop(&mut self) {
        self.gate.in_progress.store(false, Ordering::SeqCst);
        self.gate.completed.send_modify(|cycle| *cycle += 1);
    }
}
