//! Bounded batch worker pool.
//!
//! A coordinator fills and closes a bounded [`task_queue::TaskQueue`], fans
//! out a fixed number of [`worker::Worker`] threads that drain it, collects
//! their output in a lock-guarded [`result_sink::ResultSink`], and waits on a
//! [`completion::CompletionLatch`] before reporting.

pub mod completion;
pub mod config;
pub mod coordinator;
pub mod delay;
pub mod error;
pub mod logging;
pub mod result_sink;
pub mod task_queue;
pub mod types;
pub mod worker;

pub use config::PoolConfig;
pub use coordinator::{Coordinator, RunReport};
