//! Bounded, closeable FIFO task queue with blocking and non-blocking access.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use crate::error::QueueError;
use crate::types::Task;

/// A synchronized FIFO queue with a fixed capacity.
///
/// Producers block while the queue is full; consumers block while it is
/// empty and still open. Closing wakes both sides.
pub struct TaskQueue {
    inner: Mutex<TaskQueueState>,
    available: Condvar,
    space: Condvar,
    capacity: usize,
}

struct TaskQueueState {
    queue: VecDeque<Task>,
    closed: bool,
}

impl TaskQueue {
    /// Create an empty queue holding at most `capacity` tasks.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(TaskQueueState {
                queue: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            available: Condvar::new(),
            space: Condvar::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Push a task, waiting for space if the queue is full.
    ///
    /// Returns the task back if the queue is (or becomes) closed.
    pub fn push(&self, task: Task) -> Result<(), QueueError> {
        let mut guard = self.inner.lock().expect("task queue mutex poisoned");
        loop {
            if guard.closed {
                return Err(QueueError::Closed(task));
            }
            if guard.queue.len() < self.capacity {
                guard.queue.push_back(task);
                self.available.notify_one();
                return Ok(());
            }
            guard = self.space.wait(guard).expect("condvar wait failed");
        }
    }

    /// Push without waiting; fails if the queue is closed or full.
    pub fn try_push(&self, task: Task) -> Result<(), QueueError> {
        let mut guard = self.inner.lock().expect("task queue mutex poisoned");
        if guard.closed {
            return Err(QueueError::Closed(task));
        }
        if guard.queue.len() >= self.capacity {
            return Err(QueueError::Full(task));
        }
        guard.queue.push_back(task);
        self.available.notify_one();
        Ok(())
    }

    /// Try to pop immediately without blocking.
    pub fn try_pop(&self) -> Option<Task> {
        let mut guard = self.inner.lock().expect("task queue mutex poisoned");
        let task = guard.queue.pop_front();
        if task.is_some() {
            self.space.notify_one();
        }
        task
    }

    /// Block until a task is available or the queue is closed and drained.
    pub fn pop_blocking_or_closed(&self) -> Option<Task> {
        let mut guard = self.inner.lock().expect("task queue mutex poisoned");
        loop {
            if let Some(task) = guard.queue.pop_front() {
                self.space.notify_one();
                return Some(task);
            }
            if guard.closed {
                return None;
            }
            // Wait releases the lock and re-acquires it before returning.
            guard = self.available.wait(guard).expect("condvar wait failed");
        }
    }

    /// Close the queue and wake all blocked consumers and producers.
    pub fn close(&self) {
        let mut guard = self.inner.lock().expect("task queue mutex poisoned");
        guard.closed = true;
        self.available.notify_all();
        self.space.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().expect("task queue mutex poisoned").closed
    }

    /// Current number of queued tasks.
    pub fn len(&self) -> usize {
        let guard = self.inner.lock().expect("task queue mutex poisoned");
        guard.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
