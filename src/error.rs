//! Error types of a mapreduce run.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that terminate a run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("could not read record source {}: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("the dataset contains no passenger records")]
    EmptyDataset,

    #[error("map worker {worker} failed: {source}")]
    WorkerFailure {
        worker: usize,
        #[source]
        source: WorkerError,
    },

    #[error("at least one worker is required")]
    NoWorkers,
}

/// Why a single map worker gave up on its partition.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("reading records failed: {0}")]
    Source(#[from] csv::Error),

    #[error("record {index} has no passenger identifier")]
    MalformedRecord { index: usize },

    #[error("source ended after {seen} records, expected at least {expected}")]
    Truncated { expected: usize, seen: usize },

    #[error("cancelled after another worker failed")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("worker panicked: {0}")]
    Panicked(String),
}

impl WorkerError {
    /// Cancellation is a consequence of another failure, never a cause.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, WorkerError::Cancelled)
    }
}
