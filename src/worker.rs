//! Worker loop: drain the shared queue, process each task, record results.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::completion::CompletionToken;
use crate::delay::DelaySource;
use crate::error::ProcessingError;
use crate::result_sink::ResultSink;
use crate::task_queue::TaskQueue;
use crate::types::{Task, WorkerId, worker_name};

/// Per-task processing step run by a worker.
pub trait TaskProcessor: Send {
    fn process(&mut self, task: &Task) -> Result<(), ProcessingError>;
}

impl<F> TaskProcessor for F
where
    F: FnMut(&Task) -> Result<(), ProcessingError> + Send,
{
    fn process(&mut self, task: &Task) -> Result<(), ProcessingError> {
        (self)(task)
    }
}

/// Default processor: simulated work with the worker's own delay source.
pub struct SimulatedWork<D> {
    delays: D,
}

impl<D: DelaySource + Send> SimulatedWork<D> {
    pub fn new(delays: D) -> Self {
        Self { delays }
    }
}

impl<D: DelaySource + Send> TaskProcessor for SimulatedWork<D> {
    fn process(&mut self, task: &Task) -> Result<(), ProcessingError> {
        task.execute(&mut self.delays)
    }
}

/// Counters returned when a worker finishes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub id: WorkerId,
    pub processed: usize,
    pub failed: usize,
}

/// A single worker wired to the shared queue and result sink.
///
/// `run` consumes the worker, so a finished worker cannot be restarted.
pub struct Worker<P> {
    id: WorkerId,
    name: String,
    queue: Arc<TaskQueue>,
    sink: Arc<ResultSink>,
    processor: P,
}

impl<P: TaskProcessor> Worker<P> {
    pub fn new(id: WorkerId, queue: Arc<TaskQueue>, sink: Arc<ResultSink>, processor: P) -> Self {
        Self {
            id,
            name: worker_name(id),
            queue,
            sink,
            processor,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Process tasks until the queue is closed and drained, then signal
    /// completion through `token`.
    pub fn run(mut self, token: CompletionToken) -> WorkerStats {
        let mut stats = WorkerStats {
            id: self.id,
            ..WorkerStats::default()
        };
        debug!(worker = self.id, "worker started");

        while let Some(task) = self.queue.pop_blocking_or_closed() {
            info!("{} is processing Task {}", self.name, task.id);
            match self.processor.process(&task) {
                Ok(()) => {
                    self.sink
                        .append(format!("{} processed Task {}", self.name, task.id));
                    stats.processed += 1;
                }
                Err(err) => {
                    warn!("{} encountered an error: {err}", self.name);
                    stats.failed += 1;
                }
            }
        }

        info!("{} finished processing.", self.name);
        token.signal();
        stats
    }
}
