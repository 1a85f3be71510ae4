//! Parameters for a mapreduce run.
//!

use std::time::Duration;

/// How a map worker reaches the first record of its partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanStrategy {
    /// Seek to the closest index checkpoint before the partition, then skip forward.
    Seek,
    /// Read the source from its first record, skipping everything before the partition.
    Rescan,
}

/// What to do with a record whose first field is empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Fail the worker, and with it the run.
    Fail,
    /// Log and drop the record.
    Skip,
}

#[derive(Clone, Debug)]
pub struct MRParameters {
    pub workers: usize,
    pub scan: ScanStrategy,
    pub malformed: MalformedPolicy,
    pub checkpoint_interval: usize,
    pub delimiter: u8,
    pub timeout: Option<Duration>,
}

impl Default for MRParameters {
    fn default() -> MRParameters {
        MRParameters::new()
    }
}

impl MRParameters {
    pub fn new() -> MRParameters {
        MRParameters {
            workers: 4,
            scan: ScanStrategy::Seek,
            malformed: MalformedPolicy::Fail,
            checkpoint_interval: 1024,
            delimiter: b',',
            timeout: None,
        }
    }

    /// Determines how many partitions the input is split into; one map worker runs per
    /// partition, all at the same time. More workers than records is fine: the surplus
    /// partitions are simply empty.
    ///
    /// Default 4
    pub fn set_workers(mut self, n: usize) -> MRParameters {
        self.workers = n;
        self
    }

    /// Default: Seek
    pub fn set_scan_strategy(mut self, s: ScanStrategy) -> MRParameters {
        self.scan = s;
        self
    }

    /// Default: Fail
    pub fn set_malformed_policy(mut self, p: MalformedPolicy) -> MRParameters {
        self.malformed = p;
        self
    }

    /// The indexing pass remembers the position of every n-th record. A seeking worker skips
    /// at most n-1 records after seeking; the index holds size/n positions in memory.
    /// Values below 1 are treated as 1.
    ///
    /// Default 1024
    pub fn set_checkpoint_interval(mut self, n: usize) -> MRParameters {
        self.checkpoint_interval = n.max(1);
        self
    }

    /// Field delimiter of the input.
    /// Default: ','
    pub fn set_delimiter(mut self, d: u8) -> MRParameters {
        self.delimiter = d;
        self
    }

    /// Upper bound for the map phase, measured from the moment the workers are started.
    /// Workers that are still running when it passes fail the run.
    /// Default: none
    pub fn set_timeout(mut self, t: Option<Duration>) -> MRParameters {
        self.timeout = t;
        self
    }
}
