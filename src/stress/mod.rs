//! Concurrent acceptance harness for [`LockFreeQueue`].
//!
//! Every worker claims integers from a shared counter, enqueues each one and
//! immediately dequeues a value (not necessarily its own), which it forwards
//! to a collector. The run passes if each integer in `1..=total` is forwarded
//! exactly once and every worker reports completion.

mod config;
mod error;
mod tally;

pub use config::{StressConfig, TOTAL_VAR, WORKERS_VAR};
pub use error::{Result, StressError};
pub use tally::Tally;

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use crossbeam::channel::{self, Sender};
use sysinfo::System;
use tracing::{debug, info, warn};

use crate::LockFreeQueue;

/// Outcome of a successful stress run.
#[derive(Debug, Clone)]
pub struct StressReport {
    pub config: StressConfig,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub forwarded: usize,
    pub finished_workers: usize,
    pub empty_dequeues: usize,
    pub memory_before_kb: u64,
    pub memory_after_kb: u64,
}

impl StressReport {
    /// Enqueue/dequeue pairs completed per second.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.forwarded as f64 / secs
    }
}

impl fmt::Display for StressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} workers forwarded {} values in {:.3}s ({:.0} pairs/s), started {}, available memory {} KB -> {} KB",
            self.finished_workers,
            self.forwarded,
            self.elapsed.as_secs_f64(),
            self.throughput(),
            self.started_at.to_rfc3339(),
            self.memory_before_kb,
            self.memory_after_kb,
        )
    }
}

/// Shared state every worker reads from.
struct Shared<'a> {
    queue: &'a LockFreeQueue<usize>,
    counter: &'a AtomicUsize,
    empty_dequeues: &'a AtomicUsize,
    total: usize,
}

fn worker(id: usize, shared: Shared<'_>, values: Sender<usize>, done: Sender<usize>) {
    debug!(worker = id, "worker started");
    let mut forwarded = 0usize;

    loop {
        let claimed = shared.counter.fetch_add(1, Ordering::Relaxed);
        if claimed > shared.total {
            break;
        }

        shared.queue.enqueue(claimed);

        match shared.queue.dequeue() {
            Some(value) => {
                // The collector outlives every worker.
                let _ = values.send(value);
                forwarded += 1;
            }
            None => {
                shared.empty_dequeues.fetch_add(1, Ordering::Relaxed);
                warn!(worker = id, claimed, "dequeue returned nothing after enqueue");
            }
        }
    }

    debug!(worker = id, forwarded, "worker finished");
    let _ = done.send(id);
}

fn available_memory_kb(sys: &mut System) -> u64 {
    sys.refresh_memory();
    sys.available_memory() / 1024
}

/// Runs the harness described by `config` and verifies the result.
pub fn run(config: &StressConfig) -> Result<StressReport> {
    config.validate()?;

    let mut sys = System::new();
    let memory_before_kb = available_memory_kb(&mut sys);
    let started_at = Utc::now();
    info!(workers = config.workers, total = config.total, "starting stress run");

    let queue = LockFreeQueue::new();
    let counter = AtomicUsize::new(1);
    let empty_dequeues = AtomicUsize::new(0);
    let (value_tx, value_rx) = channel::unbounded();
    let (done_tx, done_rx) = channel::unbounded();

    let start = Instant::now();
    let (tally, record_error, finished_workers) = crossbeam::scope(|s| {
        for id in 0..config.workers {
            let shared = Shared {
                queue: &queue,
                counter: &counter,
                empty_dequeues: &empty_dequeues,
                total: config.total,
            };
            let values = value_tx.clone();
            let done = done_tx.clone();
            s.spawn(move |_| worker(id, shared, values, done));
        }
        // Only workers hold senders now, so both channels close once they exit.
        drop(value_tx);
        drop(done_tx);

        let mut tally = Tally::new(config.total);
        let mut record_error = None;
        for value in value_rx.iter() {
            if let Err(err) = tally.record(value) {
                record_error.get_or_insert(err);
            }
        }
        let finished = done_rx.iter().count();
        (tally, record_error, finished)
    })
    .map_err(|_| StressError::WorkerPanicked)?;
    let elapsed = start.elapsed();

    if let Some(err) = record_error {
        return Err(err);
    }
    if finished_workers != config.workers {
        return Err(StressError::Incomplete {
            finished: finished_workers,
            workers: config.workers,
        });
    }
    tally.verify()?;

    let report = StressReport {
        config: *config,
        started_at,
        elapsed,
        forwarded: tally.forwarded(),
        finished_workers,
        empty_dequeues: empty_dequeues.load(Ordering::Relaxed),
        memory_before_kb,
        memory_after_kb: available_memory_kb(&mut sys),
    };
    info!(
        forwarded = report.forwarded,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "stress run verified"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_run_verifies() {
        let report = run(&StressConfig::new(4, 10_000)).unwrap();
        assert_eq!(report.forwarded, 10_000);
        assert_eq!(report.finished_workers, 4);
        assert_eq!(report.empty_dequeues, 0);
    }

    #[test]
    fn test_single_worker_run() {
        let report = run(&StressConfig::new(1, 1_000)).unwrap();
        assert_eq!(report.forwarded, 1_000);
        assert_eq!(report.finished_workers, 1);
    }

    #[test]
    fn test_more_workers_than_values() {
        let report = run(&StressConfig::new(16, 3)).unwrap();
        assert_eq!(report.forwarded, 3);
        assert_eq!(report.finished_workers, 16);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(matches!(
            run(&StressConfig::new(0, 10)),
            Err(StressError::Config { .. })
        ));
    }

    #[test]
    fn test_report_display() {
        let report = run(&StressConfig::new(2, 100)).unwrap();
        let text = report.to_string();
        assert!(text.contains("forwarded 100 values"));
    }
}
