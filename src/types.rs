//! Shared identifiers and the task model used across the pool.

use std::thread;

use crate::delay::DelaySource;
use crate::error::ProcessingError;

/// Unique identifier for a task in the queue.
pub type TaskId = u64;
/// Unique identifier for a worker thread.
pub type WorkerId = u64;

/// Unit of work handed to workers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Task {
    /// Stable task identifier, assigned sequentially from 1.
    pub id: TaskId,
}

impl Task {
    /// Construct a new task with the provided id.
    pub fn new(id: TaskId) -> Self {
        Self { id }
    }

    /// Simulate work by sleeping for one delay drawn from `delays`.
    ///
    /// Never fails today, but callers must still handle [`ProcessingError`].
    pub fn execute<D>(&self, delays: &mut D) -> Result<(), ProcessingError>
    where
        D: DelaySource + ?Sized,
    {
        let delay = delays.next_delay();
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        Ok(())
    }
}

/// Display name used in logs and result records.
pub fn worker_name(id: WorkerId) -> String {
    format!("Worker-{id}")
}
