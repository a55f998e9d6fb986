//! Gantry Tasks - fingerprinting and concurrent output engine
//!
//! This crate decides whether tasks are up to date (status probes,
//! checksums, timestamps), evaluates many tasks concurrently for listings,
//! and shapes the output of tasks that run side by side.

pub mod executor;
pub mod fingerprint;
pub mod hash;
pub mod listing;
pub mod logger;
pub mod output;
pub mod runner;
pub mod summary;

#[cfg(test)]
mod testing;

pub use executor::{ExecuteError, Executor};
pub use fingerprint::{is_task_up_to_date, FingerprintError, FingerprintOptions, Fingerprinter};
pub use hash::{HashError, HashStrategy};
pub use listing::{evaluate_all, to_listing, FanOut, ListOptions, TaskListing, TaskRecord};
pub use logger::{CollectingLogger, Level, Logger, NullLogger, TracingLogger};
pub use output::{OutputCloser, OutputError, OutputStyle, OutputWriter, SharedSink};
pub use runner::{CommandError, CommandRunner, RunCommandOptions, ShellRunner};
