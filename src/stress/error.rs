//! Error types for the stress harness

use thiserror::Error;

/// Everything that can make a stress run fail.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StressError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Value {value} is out of range 1..={total}")]
    OutOfRange { value: usize, total: usize },

    #[error("Value {value} never returned")]
    Missing { value: usize },

    #[error("Value {value} returned {times} times")]
    Duplicate { value: usize, times: u32 },

    #[error("Only {finished} of {workers} workers signaled completion")]
    Incomplete { finished: usize, workers: usize },

    #[error("A worker thread panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, StressError>;
