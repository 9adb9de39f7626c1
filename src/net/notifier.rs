//! A thin, cloneable wrapper around an OS readiness primitive used to
//! interrupt the server's blocking I/O from another thread.
//!
//! Per spec §9: "the interrupt notifier is the only object shared across
//! threads and should be a thin wrapper around an OS readiness
//! primitive." The target-controller service's execution-state-change
//! callback runs on its own thread and calls [`Notifier::notify`] to wake
//! the server loop when an asynchronous stop/resume event needs handling.

use std::sync::Arc;

use mio::Waker;

/// Cross-thread handle used to wake the event loop out of a blocking
/// poll. Cheap to clone; all clones wake the same [`mio::Poll`].
#[derive(Clone)]
pub struct Notifier {
    waker: Arc<Waker>,
}

impl Notifier {
    pub(crate) fn new(waker: Waker) -> Self {
        Self {
            waker: Arc::new(waker),
        }
    }

    /// Wakes the event loop. Safe to call from any thread, any number of
    /// times; coalesced wakeups are fine since the loop always re-checks
    /// the full set of pending work after waking.
    pub fn notify(&self) {
        // A full disk or exhausted OS resources manifest here; there is
        // nothing more specific the caller can do about it than log.
        if let Err(err) = self.waker.wake() {
            tracing::warn!(error = %err, "failed to wake event loop");
        }
    }
}
