//! Compiled-in pool settings and their validation.

use crate::delay::DelayRange;
use crate::error::ConfigError;

/// Tasks enqueued per run.
pub const TASK_COUNT: usize = 20;
/// Concurrent worker threads.
pub const WORKER_COUNT: usize = 4;
/// Task queue capacity; must cover every task enqueued before workers start.
pub const QUEUE_CAPACITY: usize = 20;
// Simulated work duration bounds.
pub const DELAY_MIN_MS: u64 = 300;
pub const DELAY_MAX_MS: u64 = 700;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    pub task_count: usize,
    pub worker_count: usize,
    pub queue_capacity: usize,
    pub delay: DelayRange,
    /// Seed for simulated delays; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            task_count: TASK_COUNT,
            worker_count: WORKER_COUNT,
            queue_capacity: QUEUE_CAPACITY,
            delay: DelayRange::new(DELAY_MIN_MS, DELAY_MAX_MS),
            seed: None,
        }
    }
}

impl PoolConfig {
    pub fn with_tasks(mut self, task_count: usize) -> Self {
        self.task_count = task_count;
        self
    }

    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn with_delay(mut self, delay: DelayRange) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject settings under which a run could not terminate.
    ///
    /// Tasks are enqueued before any worker starts, so the queue has to
    /// hold all of them at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.queue_capacity < self.task_count {
            return Err(ConfigError::CapacityTooSmall {
                capacity: self.queue_capacity,
                tasks: self.task_count,
            });
        }
        if !self.delay.is_valid() {
            return Err(ConfigError::InvalidDelayRange {
                min_ms: self.delay.min_ms,
                max_ms: self.delay.max_ms,
            });
        }
        Ok(())
    }
}
