use std::env;
use std::str::FromStr;
use std::thread;

use tracing::debug;

use super::error::{Result, StressError};

pub const WORKERS_VAR: &str = "MSQUEUE_WORKERS";
pub const TOTAL_VAR: &str = "MSQUEUE_TOTAL";

const DEFAULT_TOTAL: usize = 1_000_000;

/// Shape of a stress run: how many worker threads and how many values in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StressConfig {
    pub workers: usize,
    pub total: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        StressConfig {
            workers: thread::available_parallelism().map_or(1, |n| n.get()),
            total: DEFAULT_TOTAL,
        }
    }
}

impl StressConfig {
    pub fn new(workers: usize, total: usize) -> Self {
        StressConfig { workers, total }
    }

    /// Defaults overridden by `MSQUEUE_WORKERS` and `MSQUEUE_TOTAL`.
    pub fn from_env() -> Result<Self> {
        let mut config = StressConfig::default();

        if let Some(workers) = read_var(WORKERS_VAR)? {
            config.workers = workers;
        }
        if let Some(total) = read_var(TOTAL_VAR)? {
            config.total = total;
        }

        config.validate()?;
        debug!(workers = config.workers, total = config.total, "loaded stress config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(StressError::Config {
                message: "workers must be at least 1".to_string(),
            });
        }
        if self.total == 0 {
            return Err(StressError::Config {
                message: "total must be at least 1".to_string(),
            });
        }
        // Every worker claims one integer past `total` before stopping.
        if self.total.checked_add(self.workers).is_none() {
            return Err(StressError::Config {
                message: "total plus workers overflows the claim counter".to_string(),
            });
        }
        Ok(())
    }
}

fn read_var<T: FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| StressError::Config {
                message: format!("Invalid {}: {}", name, e),
            }),
        Err(_) => Ok(None),
    }
}
