//! Join barrier: a countdown latch released once every worker has finished.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

struct LatchState {
    remaining: usize,
    signals: usize,
}

/// Counts completion signals from a fixed number of participants.
pub struct CompletionLatch {
    state: Mutex<LatchState>,
    released: Condvar,
}

impl CompletionLatch {
    /// Create a latch waiting for `count` signals.
    pub fn new(count: usize) -> Self {
        Self {
            state: Mutex::new(LatchState {
                remaining: count,
                signals: 0,
            }),
            released: Condvar::new(),
        }
    }

    /// Hand out a token that signals the latch when used or dropped.
    pub fn token(self: &Arc<Self>) -> CompletionToken {
        CompletionToken {
            latch: Some(Arc::clone(self)),
        }
    }

    fn count_down(&self) {
        let mut guard = self.state.lock().expect("completion latch mutex poisoned");
        guard.signals += 1;
        guard.remaining = guard.remaining.saturating_sub(1);
        if guard.remaining == 0 {
            self.released.notify_all();
        }
    }

    /// Block until every participant has signalled; returns the signal count.
    pub fn wait(&self) -> usize {
        let mut guard = self.state.lock().expect("completion latch mutex poisoned");
        while guard.remaining > 0 {
            guard = self.released.wait(guard).expect("condvar wait failed");
        }
        guard.signals
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<usize> {
        let deadline = Instant::now() + timeout;
        let mut guard = self.state.lock().expect("completion latch mutex poisoned");
        while guard.remaining > 0 {
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let (next, _) = self
                .released
                .wait_timeout(guard, deadline - now)
                .expect("condvar wait failed");
            guard = next;
        }
        Some(guard.signals)
    }

    pub fn remaining(&self) -> usize {
        self.state
            .lock()
            .expect("completion latch mutex poisoned")
            .remaining
    }
}

/// One participant's completion signal. Dropping it counts as signalling,
/// so a panicking worker still releases the latch.
pub struct CompletionToken {
    latch: Option<Arc<CompletionLatch>>,
}

impl CompletionToken {
    pub fn signal(mut self) {
        if let Some(latch) = self.latch.take() {
            latch.count_down();
        }
    }
}

impl Drop for CompletionToken {
    fn drop(&mut self) {
        if let Some(latch) = self.latch.take() {
            latch.count_down();
        }
    }
}
