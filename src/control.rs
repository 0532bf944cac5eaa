//! Run control and liveness flags.
//!
//! [`PollControl`] is a cloneable handle over the poller's `stopped` and
//! `busy` flags. Clone it and hand it to a supervisor thread or a signal
//! handler; a stop request from any clone is observed by the read loop at
//! the top of its next iteration.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Cloneable stop/busy handle backed by atomics.
///
/// Stop requests are **advisory**: they never preempt an in-flight frame
/// sink call. The busy flag is true only during the synchronous extent of a
/// sink invocation; it exists purely for external observation and carries no
/// locking guarantee.
///
/// # Example
///
/// ```
/// use framepoll::PollControl;
///
/// let control = PollControl::new();
/// assert!(!control.is_stopped());
///
/// // From another thread (or a signal handler, etc.):
/// control.request_stop();
/// assert!(control.is_stopped());
/// ```
#[derive(Debug, Clone)]
pub struct PollControl {
    stopped: Arc<AtomicBool>,
    busy: Arc<AtomicBool>,
}

impl PollControl {
    /// Create a new handle with both flags clear.
    pub fn new() -> Self {
        Self {
            stopped: Arc::new(AtomicBool::new(false)),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request that the current run stop.
    ///
    /// Sets `stopped` and clears `busy`. All clones observe the request; the
    /// read loop honors it before reading the next frame.
    pub fn request_stop(&self) {
        self.stopped.store(true, Ordering::Release);
        self.busy.store(false, Ordering::Release);
    }

    /// Whether a stop has been requested for the current run.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Whether a frame sink call is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Clear the stop flag at the start of a run.
    pub(crate) fn reset(&self) {
        self.stopped.store(false, Ordering::Release);
        self.busy.store(false, Ordering::Release);
    }

    /// Mark the start/end of a sink invocation.
    pub(crate) fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::Release);
    }
}

impl Default for PollControl {
    fn default() -> Self {
        Self::new()
    }
}
