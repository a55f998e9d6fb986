//! Task up-to-date evaluation
//!
//! A [`Fingerprinter`] decides whether a task's previous output can be
//! reused. Status probes, when a task declares any, are authoritative;
//! otherwise the task's [`FingerprintMethod`] picks a checker.

mod checksum;
mod status;
mod timestamp;

pub use checksum::ChecksumChecker;
pub use status::StatusChecker;
pub use timestamp::TimestampChecker;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use gantry_core::config::DEFAULT_TEMP_DIR;
use gantry_core::task::{FingerprintMethod, Task};

use crate::hash::{HashError, HashStrategy};
use crate::logger::{Logger, NullLogger};
use crate::runner::{CommandError, CommandRunner};

/// Fingerprint evaluation errors
#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    /// The task's identity key could not be computed
    #[error("failed to hash task '{task}': {source}")]
    Hash {
        task: String,
        #[source]
        source: HashError,
    },

    /// A status command could not be run
    #[error("status check for task '{task}' failed: {source}")]
    Command {
        task: String,
        #[source]
        source: CommandError,
    },

    /// A sources/generates pattern is malformed
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Reading or writing fingerprint state failed
    #[error("fingerprint IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A concurrent evaluation unit panicked or was cancelled
    #[error("evaluation of task '{task}' did not complete: {message}")]
    Join { task: String, message: String },
}

/// Settings for [`Fingerprinter`]
#[derive(Clone)]
pub struct FingerprintOptions {
    method: Option<FingerprintMethod>,
    temp_dir: PathBuf,
    dry: bool,
    logger: Arc<dyn Logger>,
}

impl FingerprintOptions {
    pub fn new() -> Self {
        Self {
            method: None,
            temp_dir: PathBuf::from(DEFAULT_TEMP_DIR),
            dry: false,
            logger: Arc::new(NullLogger),
        }
    }

    /// Force a method for every task instead of each task's own
    pub fn method(mut self, method: FingerprintMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Directory holding checksum and timestamp state
    pub fn temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    /// Evaluate without touching persisted state
    pub fn dry(mut self, dry: bool) -> Self {
        self.dry = dry;
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }
}

impl Default for FingerprintOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FingerprintOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FingerprintOptions")
            .field("method", &self.method)
            .field("temp_dir", &self.temp_dir)
            .field("dry", &self.dry)
            .finish_non_exhaustive()
    }
}

/// Up-to-date predicate over tasks
pub struct Fingerprinter {
    status: StatusChecker,
    checksum: ChecksumChecker,
    timestamp: TimestampChecker,
    method: Option<FingerprintMethod>,
}

impl Fingerprinter {
    pub fn new(runner: Arc<dyn CommandRunner>, options: FingerprintOptions) -> Self {
        let FingerprintOptions {
            method,
            temp_dir,
            dry,
            logger,
        } = options;

        Self {
            status: StatusChecker::new(runner, logger.clone()),
            checksum: ChecksumChecker::new(temp_dir.clone(), dry, logger.clone()),
            timestamp: TimestampChecker::new(temp_dir, dry, logger),
            method,
        }
    }

    /// Method used for `task` when it has no status commands
    pub fn method_for(&self, task: &Task) -> FingerprintMethod {
        self.method.unwrap_or(task.method)
    }

    /// Whether `task` can be skipped
    pub async fn is_task_up_to_date(&self, task: &Task) -> Result<bool, FingerprintError> {
        if !task.status.is_empty() {
            return self.status.is_up_to_date(task).await;
        }

        let method = self.method_for(task);
        debug!(task = %task.task, method = %method, "evaluating fingerprint");

        match method {
            FingerprintMethod::None => Ok(false),
            FingerprintMethod::Status => self.status.is_up_to_date(task).await,
            FingerprintMethod::Checksum => self.checksum.is_up_to_date(task),
            FingerprintMethod::Timestamp => self.timestamp.is_up_to_date(task),
        }
    }

    /// Discard the state stored while evaluating `task`, after its run failed.
    ///
    /// Checksum and timestamp state is written during evaluation, before the
    /// task runs; without this a failed run would be treated as up to date
    /// next time.
    pub fn on_error(&self, task: &Task) -> Result<(), FingerprintError> {
        if task.sources.is_empty() {
            return Ok(());
        }
        debug!(task = %task.task, "discarding fingerprint state after failure");
        self.checksum.reset(task)?;
        self.timestamp.reset(task)
    }

    /// Identity key used to deduplicate runs of `task`
    pub fn hash_key(&self, task: &Task) -> Result<String, FingerprintError> {
        HashStrategy::for_run_policy(task.run)
            .hash(task)
            .map_err(|source| FingerprintError::Hash {
                task: task.task.clone(),
                source,
            })
    }
}

/// One-shot evaluation with a throwaway [`Fingerprinter`]
pub async fn is_task_up_to_date(
    task: &Task,
    runner: Arc<dyn CommandRunner>,
    options: FingerprintOptions,
) -> Result<bool, FingerprintError> {
    Fingerprinter::new(runner, options)
        .is_task_up_to_date(task)
        .await
}

/// Files matched by `patterns`, resolved against `dir`
pub(crate) fn glob_files(
    dir: &Path,
    patterns: &[String],
) -> Result<BTreeSet<PathBuf>, FingerprintError> {
    let mut files = BTreeSet::new();

    for pattern in patterns {
        let full = dir.join(pattern);
        let entries =
            glob::glob(&full.to_string_lossy()).map_err(|source| FingerprintError::Pattern {
                pattern: pattern.clone(),
                source,
            })?;

        files.extend(entries.flatten().filter(|path| path.is_file()));
    }

    Ok(files)
}

/// File name used for a task's persisted state
pub(crate) fn state_file_name(task: &Task) -> String {
    task.task.replace(':', "-")
}

/// Remove a state file; a missing one is fine
pub(crate) fn remove_state(path: &Path) -> Result<(), FingerprintError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(FingerprintError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
