//! Implements the Map phase: counting the flights of each passenger within one partition.
//!

use std::io::{Read, Seek};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::{debug, warn};

use crate::error::WorkerError;
use crate::formats::records::{first_field, RecordIndex, RecordReader};
use crate::parameters::{MRParameters, MalformedPolicy, ScanStrategy};
use crate::partition::Partition;
use crate::record_types::{PassengerCounts, WorkerOutput};

/// Number of records between two checks for cancellation and deadline.
const CANCEL_CHECK_INTERVAL: usize = 1024;

/// State shared (read-only) by all map workers of one run.
pub struct MapContext<'a> {
    pub path: &'a Path,
    pub index: &'a RecordIndex,
    pub params: &'a MRParameters,
    /// Set by the first worker that fails; all others stop at their next check.
    pub cancel: &'a AtomicBool,
    pub deadline: Option<Instant>,
}

impl<'a> MapContext<'a> {
    fn check_interrupt(&self) -> Result<(), WorkerError> {
        if self.cancel.load(Ordering::Relaxed) {
            return Err(WorkerError::Cancelled);
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => Err(WorkerError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

/// This is the base of the mapping phase. One MapPartition is run by each map worker; it owns
/// the partial counts it builds until they are handed back to the controller.
pub struct MapPartition<'a> {
    ctx: &'a MapContext<'a>,
    worker: usize,
    partition: Partition,
    counts: PassengerCounts,
    counted: usize,
    skipped: usize,
}

impl<'a> MapPartition<'a> {
    pub fn new(ctx: &'a MapContext<'a>, worker: usize, partition: Partition) -> MapPartition<'a> {
        MapPartition {
            ctx,
            worker,
            partition,
            counts: PassengerCounts::new(),
            counted: 0,
            skipped: 0,
        }
    }

    /// Opens the source independently of all other workers and counts the partition.
    pub fn run(self) -> Result<WorkerOutput, WorkerError> {
        if self.partition.is_empty() {
            debug!(worker = self.worker, "empty partition");
            return Ok(self.into_output());
        }
        let rdr = RecordReader::new_from_file(self.ctx.path, self.ctx.params.delimiter)?;
        self.run_on(rdr)
    }

    fn run_on<Src: Read + Seek>(mut self,
                                mut rdr: RecordReader<Src>)
                                -> Result<WorkerOutput, WorkerError> {
        debug!(worker = self.worker,
               start = self.partition.start,
               len = self.partition.len,
               "map partition started");

        self.seek_to_start(&mut rdr)?;
        self.count(&mut rdr)?;

        debug!(worker = self.worker,
               counted = self.counted,
               skipped = self.skipped,
               passengers = self.counts.len(),
               "map partition finished");
        Ok(self.into_output())
    }

    /// Positions `rdr` at the first record of the partition. Nothing read here is counted.
    fn seek_to_start<Src: Read + Seek>(&self, rdr: &mut RecordReader<Src>) -> Result<(), WorkerError> {
        let start = self.partition.start;

        if self.ctx.params.scan == ScanStrategy::Seek && start > 0 {
            if let Some(cp) = self.ctx.index.checkpoint_for(start) {
                rdr.seek(cp)?;
            }
        }

        while rdr.index() < start {
            self.ctx.check_interrupt()?;
            let want = (start - rdr.index()).min(CANCEL_CHECK_INTERVAL);
            if rdr.skip(want)? < want {
                return Err(WorkerError::Truncated {
                    expected: self.partition.end(),
                    seen: rdr.index(),
                });
            }
        }
        Ok(())
    }

    /// Counts records until the end of the partition. The reader must be positioned at its
    /// start.
    fn count<Src: Read>(&mut self, rdr: &mut RecordReader<Src>) -> Result<(), WorkerError> {
        let (start, end) = (self.partition.start, self.partition.end());

        while self.partition.contains(rdr.index()) {
            let index = rdr.index();
            if (index - start) % CANCEL_CHECK_INTERVAL == 0 {
                self.ctx.check_interrupt()?;
            }

            let record = match rdr.read_next()? {
                None => {
                    return Err(WorkerError::Truncated {
                        expected: end,
                        seen: index,
                    })
                }
                Some(r) => r,
            };

            match first_field(record) {
                Some(passenger) => {
                    self.counts.increment(passenger);
                    self.counted += 1;
                }
                None => match self.ctx.params.malformed {
                    MalformedPolicy::Fail => return Err(WorkerError::MalformedRecord { index }),
                    MalformedPolicy::Skip => {
                        warn!(worker = self.worker, index, "skipping record without passenger id");
                        self.skipped += 1;
                    }
                },
            }
        }
        Ok(())
    }

    fn into_output(self) -> WorkerOutput {
        WorkerOutput {
            worker: self.worker,
            counts: self.counts,
            counted: self.counted,
            skipped: self.skipped,
        }
    }
}
