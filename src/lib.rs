//! Implements a mapreduce process bounded to one machine, counting the flights of each passenger
//! in a flight records file and finding the most frequent flyers.
//!
//! The input file is split into contiguous partitions of records; one map worker per partition
//! counts flights per passenger, the reduce phase sums the partial counts, and a final scan
//! picks every passenger with the highest count.
//!

pub mod controller;
pub mod error;
pub mod formats;
pub mod map;
pub mod max;
pub mod parameters;
pub mod partition;
pub mod record_types;
pub mod reduce;

pub use controller::{MRController, RunReport};
pub use error::{Error, Result, WorkerError};
pub use max::TopPassengers;
pub use parameters::{MRParameters, MalformedPolicy, ScanStrategy};
