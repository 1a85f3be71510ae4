//! Controls the execution of a mapreduce instance.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::sync_channel;
use std::time::Instant;

use scoped_threadpool::Pool;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::error::{Error, Result, WorkerError};
use crate::formats::records::RecordIndex;
use crate::map::{MapContext, MapPartition};
use crate::max::{find_max, TopPassengers};
use crate::parameters::MRParameters;
use crate::partition::{partition, Partition};
use crate::record_types::WorkerOutput;
use crate::reduce::merge;

/// Outcome of a successful run.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub top: TopPassengers,
    /// Records in the source.
    pub records: usize,
    /// Records dropped as malformed.
    pub skipped: usize,
    pub workers: usize,
    pub started_at: OffsetDateTime,
    pub elapsed: time::Duration,
}

pub struct MRController<'a> {
    params: MRParameters,
    path: &'a Path,
}

impl<'a> MRController<'a> {
    /// Create a new mapreduce instance over the file at `path` and execute it immediately.
    pub fn run(path: &'a Path, params: MRParameters) -> Result<RunReport> {
        let controller = MRController { params, path };
        controller.execute()
    }

    fn execute(&self) -> Result<RunReport> {
        let started_at = OffsetDateTime::now_utc();
        info!(path = %self.path.display(), workers = self.params.workers, "run started");

        let index = RecordIndex::build(self.path,
                                       self.params.delimiter,
                                       self.params.checkpoint_interval)
            .map_err(|e| Error::SourceUnavailable {
                path: self.path.to_path_buf(),
                source: e,
            })?;
        if index.total() == 0 {
            return Err(Error::EmptyDataset);
        }

        let partitions = partition(index.total(), self.params.workers)?;
        for (i, p) in partitions.iter().enumerate() {
            debug!(worker = i, start = p.start, len = p.len, "partition");
        }

        let outputs = self.run_map(&index, &partitions)?;
        let counted: usize = outputs.iter().map(|o| o.counted).sum();
        let skipped: usize = outputs.iter().map(|o| o.skipped).sum();
        debug_assert_eq!(counted + skipped, index.total());

        let global = merge(outputs.into_iter().map(|o| o.counts));
        debug!(passengers = global.len(), flights = global.total_flights(), "reduce finished");
        let top = find_max(&global)?;
        let elapsed = OffsetDateTime::now_utc() - started_at;

        Ok(RunReport {
            top,
            records: index.total(),
            skipped,
            workers: partitions.len(),
            started_at,
            elapsed,
        })
    }

    /// Runs one map worker per non-empty partition, all at once, and waits for every one of
    /// them. Empty partitions are completed inline. Fails if any worker failed.
    fn run_map(&self, index: &RecordIndex, partitions: &[Partition]) -> Result<Vec<WorkerOutput>> {
        let cancel = AtomicBool::new(false);
        let ctx = MapContext {
            path: self.path,
            index,
            params: &self.params,
            cancel: &cancel,
            deadline: self.params.timeout.map(|t| Instant::now() + t),
        };

        // Every worker owns exactly one slot.
        let mut slots: Vec<Option<std::result::Result<WorkerOutput, WorkerError>>> =
            Vec::with_capacity(partitions.len());
        let mut busy = Vec::new();
        for (i, p) in partitions.iter().enumerate() {
            if p.is_empty() {
                slots.push(Some(MapPartition::new(&ctx, i, *p).run()));
            } else {
                slots.push(None);
                busy.push((i, *p));
            }
        }
        if busy.is_empty() {
            return collect_outputs(slots);
        }

        let threads = u32::try_from(busy.len()).unwrap_or(u32::MAX);
        debug!(threads, empty = partitions.len() - busy.len(), "starting map workers");

        let (send, recv) = sync_channel(busy.len());
        let mut pool = Pool::new(threads);

        pool.scoped(|scope| {
            for &(i, p) in &busy {
                let ctx = &ctx;
                let done = send.clone();

                scope.execute(move || {
                    let result = panic::catch_unwind(AssertUnwindSafe(|| MapPartition::new(ctx, i, p).run()))
                        .unwrap_or_else(|e| Err(WorkerError::Panicked(panic_message(e))));
                    if result.is_err() {
                        ctx.cancel.store(true, Ordering::Relaxed);
                    }
                    let _ = done.send((i, result));
                });
            }
            scope.join_all();
        });
        drop(send);

        for (i, result) in recv.iter() {
            slots[i] = Some(result);
        }
        collect_outputs(slots)
    }
}

/// Converts the worker slots into outputs, or into the error that caused the run to fail.
/// Cancellations are only reported if no worker failed for another reason.
fn collect_outputs(slots: Vec<Option<std::result::Result<WorkerOutput, WorkerError>>>)
                   -> Result<Vec<WorkerOutput>> {
    let mut outputs = Vec::with_capacity(slots.len());
    let mut failure: Option<(usize, WorkerError)> = None;

    for (i, slot) in slots.into_iter().enumerate() {
        let err = match slot {
            Some(Ok(out)) => {
                outputs.push(out);
                continue;
            }
            Some(Err(e)) => e,
            None => WorkerError::Panicked(String::from("worker exited without a result")),
        };

        warn!(worker = i, error = %err, "map worker failed");
        let replace = match failure {
            None => true,
            Some((_, ref f)) => f.is_cancellation() && !err.is_cancellation(),
        };
        if replace {
            failure = Some((i, err));
        }
    }

    match failure {
        Some((worker, source)) => Err(Error::WorkerFailure { worker, source }),
        None => Ok(outputs),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        String::from(*s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("unknown panic")
    }
}
