//! Error types for task execution, queue access and pool configuration.

use thiserror::Error;

use crate::types::{Task, TaskId};

/// Failure of a single task's execution. Recovered inside the worker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessingError {
    #[error("task {task_id} failed: {reason}")]
    Failed { task_id: TaskId, reason: String },
}

impl ProcessingError {
    pub fn failed(task_id: TaskId, reason: impl Into<String>) -> Self {
        Self::Failed {
            task_id,
            reason: reason.into(),
        }
    }
}

/// Rejected insertion; the task is handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("task queue closed, rejected task {}", .0.id)]
    Closed(Task),
    #[error("task queue full, rejected task {}", .0.id)]
    Full(Task),
}

impl QueueError {
    /// Recover the rejected task.
    pub fn into_task(self) -> Task {
        match self {
            Self::Closed(task) | Self::Full(task) => task,
        }
    }
}

/// Pool settings that cannot produce a terminating run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("worker count must be > 0")]
    NoWorkers,
    #[error("queue capacity must be > 0")]
    ZeroCapacity,
    #[error("queue capacity {capacity} is smaller than task count {tasks}")]
    CapacityTooSmall { capacity: usize, tasks: usize },
    #[error("invalid delay range {min_ms}..={max_ms} ms")]
    InvalidDelayRange { min_ms: u64, max_ms: u64 },
}
