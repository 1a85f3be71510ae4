//! Splits the record sequence into contiguous map partitions.

use crate::error::{Error, Result};

/// Half-open range of record indices `[start, start + len)` handled by one map worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Partition {
    pub start: usize,
    pub len: usize,
}

impl Partition {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end()
    }
}

/// Divides `size` records into `workers` partitions of `size / workers` records each; the last
/// partition additionally takes the remainder. With fewer records than workers all but the last
/// partition are empty.
pub fn partition(size: usize, workers: usize) -> Result<Vec<Partition>> {
    if workers == 0 {
        return Err(Error::NoWorkers);
    }
    let chunk = size / workers;

    let mut parts = Vec::with_capacity(workers);
    for i in 0..workers {
        let start = i * chunk;
        let len = if i < workers - 1 { chunk } else { size - start };
        parts.push(Partition { start, len });
    }
    Ok(parts)
}
