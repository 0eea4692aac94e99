//! Run orchestration: fill and close the queue, fan out workers, wait on
//! the join barrier, collect results.

use std::io::{self, Write};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, info};

use crate::completion::CompletionLatch;
use crate::config::PoolConfig;
use crate::delay::RandomDelay;
use crate::error::ConfigError;
use crate::result_sink::ResultSink;
use crate::task_queue::TaskQueue;
use crate::types::{Task, WorkerId};
use crate::worker::{SimulatedWork, TaskProcessor, Worker, WorkerStats};

/// Header printed before the result records.
pub const RESULTS_HEADER: &str = "Final Results:";

/// Best-effort CPU user/system time snapshot (seconds) on Unix platforms.
#[cfg(unix)]
fn cpu_times_seconds() -> Option<(f64, f64)> {
    use libc::{RUSAGE_SELF, getrusage, rusage};
    // SAFETY: rusage is plain old data; all-zero is a valid value.
    let mut usage: rusage = unsafe { std::mem::zeroed() };
    let rc = unsafe { getrusage(RUSAGE_SELF, &mut usage) };
    if rc != 0 {
        return None;
    }
    let user = usage.ru_utime.tv_sec as f64 + (usage.ru_utime.tv_usec as f64 / 1_000_000.0);
    let sys = usage.ru_stime.tv_sec as f64 + (usage.ru_stime.tv_usec as f64 / 1_000_000.0);
    Some((user, sys))
}

/// Stub on non-Unix platforms.
#[cfg(not(unix))]
fn cpu_times_seconds() -> Option<(f64, f64)> {
    None
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunReport {
    /// Result records in completion order.
    pub results: Vec<String>,
    /// Stats of every worker that was joined cleanly.
    pub workers: Vec<WorkerStats>,
    /// Completion signals observed by the join barrier.
    pub completions: usize,
    pub tasks_enqueued: usize,
    pub elapsed: Duration,
    pub cpu_user_s: Option<f64>,
    pub cpu_sys_s: Option<f64>,
}

impl RunReport {
    pub fn failed(&self) -> usize {
        self.workers.iter().map(|stats| stats.failed).sum()
    }

    /// Log a one-line summary of the run.
    pub fn log_summary(&self) {
        let cpu = match (self.cpu_user_s, self.cpu_sys_s) {
            (Some(user), Some(sys)) => format!("user={user:.4}s sys={sys:.4}s"),
            _ => "NA".to_string(),
        };
        info!(
            "run finished: tasks={} results={} failed={} workers={} elapsed_ms={} cpu={cpu}",
            self.tasks_enqueued,
            self.results.len(),
            self.failed(),
            self.completions,
            self.elapsed.as_millis(),
        );
    }

    /// Write a blank line, the header, then one line per result.
    pub fn write_results<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{RESULTS_HEADER}")?;
        for entry in &self.results {
            writeln!(out, "{entry}")?;
        }
        out.flush()
    }
}

/// Owns a validated configuration and executes runs against it.
pub struct Coordinator {
    config: PoolConfig,
}

impl Coordinator {
    pub fn new(config: PoolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run with simulated work; each worker gets a delay source derived
    /// from one explicitly seeded generator.
    pub fn run(&self) -> RunReport {
        let mut master = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let range = self.config.delay;
        self.run_with(|_| SimulatedWork::new(RandomDelay::derive(&mut master, range)))
    }

    /// Run with a processor built per worker by `make_processor`.
    pub fn run_with<P, F>(&self, mut make_processor: F) -> RunReport
    where
        P: TaskProcessor + 'static,
        F: FnMut(WorkerId) -> P,
    {
        let PoolConfig {
            task_count,
            worker_count,
            queue_capacity,
            ..
        } = self.config;

        let queue = Arc::new(TaskQueue::new(queue_capacity));
        let mut tasks_enqueued = 0usize;
        for id in 1..=task_count as u64 {
            match queue.push(Task::new(id)) {
                Ok(()) => tasks_enqueued += 1,
                Err(err) => error!("failed to enqueue task {id}: {err}"),
            }
        }
        queue.close();
        debug!(
            "[QUEUE] loaded tasks total={tasks_enqueued} capacity={}",
            queue.capacity()
        );

        let sink = Arc::new(ResultSink::new());
        let latch = Arc::new(CompletionLatch::new(worker_count));

        let cpu_start = cpu_times_seconds();
        let start = Instant::now();
        let mut handles = Vec::with_capacity(worker_count);
        for id in 1..=worker_count as WorkerId {
            let worker = Worker::new(
                id,
                Arc::clone(&queue),
                Arc::clone(&sink),
                make_processor(id),
            );
            let token = latch.token();
            // A failed spawn drops the closure and its token, so the latch
            // still counts this slot.
            match thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || worker.run(token))
            {
                Ok(handle) => handles.push(handle),
                Err(err) => error!("failed to spawn worker {id}: {err}"),
            }
        }

        let completions = latch.wait();
        debug!("join barrier released after {completions} completion signals");

        let mut workers = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.join() {
                Ok(stats) => workers.push(stats),
                Err(_) => error!("worker thread panicked"),
            }
        }
        let elapsed = start.elapsed();

        let results = match Arc::try_unwrap(sink) {
            Ok(sink) => sink.into_entries(),
            Err(shared) => shared.snapshot(),
        };

        let (cpu_user_s, cpu_sys_s) = match (cpu_start, cpu_times_seconds()) {
            (Some((user_start, sys_start)), Some((user_end, sys_end))) => {
                (Some(user_end - user_start), Some(sys_end - sys_start))
            }
            _ => (None, None),
        };

        RunReport {
            results,
            workers,
            completions,
            tasks_enqueued,
            elapsed,
            cpu_user_s,
            cpu_sys_s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::DelayRange;
    use crate::error::ProcessingError;
    use std::collections::HashSet;
    use std::sync::Mutex;

    fn fast_config() -> PoolConfig {
        PoolConfig::default()
            .with_delay(DelayRange::new(0, 5))
            .with_seed(11)
    }

    #[test]
    fn default_scenario_records_every_task() {
        let coordinator = Coordinator::new(fast_config()).expect("valid config");
        let report = coordinator.run();

        assert_eq!(report.tasks_enqueued, 20);
        assert_eq!(report.completions, 4);
        assert_eq!(report.workers.len(), 4);
        assert_eq!(report.results.len(), 20);
        assert_eq!(report.failed(), 0);

        let ids: HashSet<u64> = report
            .results
            .iter()
            .map(|entry| {
                let (worker, task) = entry
                    .split_once(" processed Task ")
                    .expect("malformed result");
                assert!(worker.starts_with("Worker-"));
                task.parse().expect("task id")
            })
            .collect();
        assert_eq!(ids, (1..=20).collect());
    }

    #[test]
    fn each_task_delivered_exactly_once() {
        let config = fast_config()
            .with_tasks(200)
            .with_capacity(200)
            .with_workers(8);
        let coordinator = Coordinator::new(config).expect("valid config");
        let seen = Arc::new(Mutex::new(Vec::new()));

        let report = coordinator.run_with(|_| {
            let seen = Arc::clone(&seen);
            move |task: &Task| -> Result<(), ProcessingError> {
                seen.lock().expect("seen mutex poisoned").push(task.id);
                Ok(())
            }
        });

        let mut seen = seen.lock().expect("seen mutex poisoned").clone();
        seen.sort_unstable();
        assert_eq!(seen, (1..=200).collect::<Vec<_>>());
        assert_eq!(report.completions, 8);
        let processed: usize = report.workers.iter().map(|stats| stats.processed).sum();
        assert_eq!(processed, 200);
    }

    #[test]
    fn zero_tasks_prints_header_only() {
        let coordinator =
            Coordinator::new(fast_config().with_tasks(0)).expect("valid config");
        let report = coordinator.run();

        assert_eq!(report.completions, 4);
        assert!(report.results.is_empty());

        let mut out = Vec::new();
        report.write_results(&mut out).expect("write results");
        assert_eq!(String::from_utf8(out).expect("utf8"), "\nFinal Results:\n");
    }

    #[test]
    fn failures_reduce_results_without_aborting() {
        let coordinator = Coordinator::new(fast_config()).expect("valid config");
        let report = coordinator.run_with(|_| {
            |task: &Task| {
                if task.id % 5 == 0 {
                    Err(ProcessingError::failed(task.id, "multiple of five"))
                } else {
                    Ok(())
                }
            }
        });

        assert_eq!(report.completions, 4);
        assert_eq!(report.failed(), 4);
        assert_eq!(report.results.len(), 16);
        assert!(report.results.len() <= report.tasks_enqueued);
    }

    #[test]
    fn panicking_worker_does_not_hang_run() {
        let coordinator = Coordinator::new(fast_config()).expect("valid config");
        let report = coordinator.run_with(|_| {
            |task: &Task| -> Result<(), ProcessingError> {
                if task.id == 7 {
                    panic!("crashed on task {}", task.id);
                }
                Ok(())
            }
        });

        assert_eq!(report.completions, 4);
        assert_eq!(report.workers.len(), 3);
        // The crashed worker's task is lost; the others drain the rest.
        assert_eq!(report.results.len(), 19);
        assert!(
            report
                .results
                .iter()
                .all(|entry| !entry.ends_with(" Task 7"))
        );
    }

    #[test]
    fn write_results_lists_entries_after_header() {
        let report = RunReport {
            results: vec![
                "Worker-2 processed Task 1".to_string(),
                "Worker-1 processed Task 2".to_string(),
            ],
            workers: Vec::new(),
            completions: 2,
            tasks_enqueued: 2,
            elapsed: Duration::ZERO,
            cpu_user_s: None,
            cpu_sys_s: None,
        };
        let mut out = Vec::new();
        report.write_results(&mut out).expect("write results");
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "\nFinal Results:\nWorker-2 processed Task 1\nWorker-1 processed Task 2\n"
        );
    }

    #[test]
    fn rejects_invalid_config() {
        assert!(matches!(
            Coordinator::new(PoolConfig::default().with_workers(0)),
            Err(ConfigError::NoWorkers)
        ));
    }
}
