//! Task execution
//!
//! [`Executor::run`] starts one tokio task per requested name. Each task is
//! checked against its fingerprint, skipped when up to date, and otherwise
//! has its commands run in order with output shaped by the configured
//! [`OutputStyle`]. Commands that reference another task run it inline.

use std::collections::HashMap;
use std::future::Future;
use std::io::Write;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use console::style;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use gantry_core::env;
use gantry_core::error::TemplateError;
use gantry_core::task::{Cmd, Task};
use gantry_core::templater::{TemplateCache, Templater};
use gantry_core::Taskfile;

use crate::fingerprint::{FingerprintError, Fingerprinter};
use crate::logger::{Logger, NullLogger};
use crate::output::{OutputError, OutputStyle, OutputWriter, SharedSink};
use crate::runner::{CommandError, CommandRunner, RunCommandOptions};

/// Nesting limit for task-reference commands
pub const MAX_CALL_DEPTH: usize = 100;

/// Task execution errors
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    #[error("task \"{0}\" does not exist")]
    UnknownTask(String),

    #[error("maximum task call depth exceeded calling \"{0}\"")]
    CallDepth(String),

    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("invalid command in task \"{task}\": {source}")]
    Template {
        task: String,
        #[source]
        source: TemplateError,
    },

    #[error("task \"{task}\" failed: {source}")]
    Command {
        task: String,
        #[source]
        source: CommandError,
    },

    #[error("task \"{task}\" did not complete: {message}")]
    Join { task: String, message: String },
}

type CallFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ExecuteError>> + Send + 'a>>;

/// Runs tasks from one taskfile
pub struct Executor {
    taskfile: Taskfile,
    runner: Arc<dyn CommandRunner>,
    fingerprinter: Arc<Fingerprinter>,
    stdout: SharedSink,
    stderr: SharedSink,
    style: OutputStyle,
    dry: bool,
    force: bool,
    logger: Arc<dyn Logger>,
    /// Hash keys of `once` / `when_changed` tasks started in this run
    started: Mutex<HashMap<String, Arc<OnceCell<()>>>>,
}

impl Executor {
    pub fn new(
        taskfile: Taskfile,
        runner: Arc<dyn CommandRunner>,
        fingerprinter: Arc<Fingerprinter>,
        stdout: SharedSink,
        stderr: SharedSink,
    ) -> Self {
        Self {
            taskfile,
            runner,
            fingerprinter,
            stdout,
            stderr,
            style: OutputStyle::default(),
            dry: false,
            force: false,
            logger: Arc::new(NullLogger),
            started: Mutex::new(HashMap::new()),
        }
    }

    pub fn style(mut self, style: OutputStyle) -> Self {
        self.style = style;
        self
    }

    /// Announce commands without running them
    pub fn dry(mut self, dry: bool) -> Self {
        self.dry = dry;
        self
    }

    /// Run tasks even when they are up to date
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Run every named task concurrently and wait for all of them.
    ///
    /// Names are checked before anything starts. A failing task does not
    /// stop the others; the first error by launch order is returned.
    pub async fn run(self: Arc<Self>, names: &[String]) -> Result<(), ExecuteError> {
        for name in names {
            self.find(name)?;
        }

        let handles: Vec<_> = names
            .iter()
            .cloned()
            .map(|name| {
                let executor = self.clone();
                tokio::spawn(async move { executor.call(&name, &[], 0).await })
            })
            .collect();

        let mut first_error = None;
        for (name, handle) in names.iter().zip(handles) {
            let result = match handle.await {
                Ok(result) => result,
                Err(err) => Err(ExecuteError::Join {
                    task: name.clone(),
                    message: err.to_string(),
                }),
            };
            if let Err(err) = result {
                debug!(task = %name, error = %err, "task failed");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn find(&self, name: &str) -> Result<&Task, ExecuteError> {
        self.taskfile
            .get(name)
            .ok_or_else(|| ExecuteError::UnknownTask(name.to_string()))
    }

    /// Cell guarding the single run of a `once` / `when_changed` key
    fn run_once(&self, key: &str) -> Arc<OnceCell<()>> {
        let mut started = self.started.lock().unwrap_or_else(PoisonError::into_inner);
        started.entry(key.to_string()).or_default().clone()
    }

    fn call<'a>(&'a self, name: &'a str, held: &'a [String], depth: usize) -> CallFuture<'a> {
        Box::pin(async move {
            if depth > MAX_CALL_DEPTH {
                return Err(ExecuteError::CallDepth(name.to_string()));
            }
            let task = self.find(name)?;

            let key = self.fingerprinter.hash_key(task)?;
            if key.is_empty() {
                return self.execute(task, held, depth).await;
            }
            if held.contains(&key) {
                debug!(task = %task.task, "already running further up the call chain");
                return Ok(());
            }

            // later callers wait here until the first run has finished
            let mut held = held.to_vec();
            held.push(key.clone());
            let mut outcome = None;
            let slot = &mut outcome;
            self.run_once(&key)
                .get_or_init(|| async move {
                    *slot = Some(self.execute(task, &held, depth).await);
                })
                .await;

            outcome.unwrap_or_else(|| {
                debug!(task = %task.task, "already ran in this run");
                Ok(())
            })
        })
    }

    async fn execute(
        &self,
        task: &Task,
        held: &[String],
        depth: usize,
    ) -> Result<(), ExecuteError> {
        if !self.force && self.fingerprinter.is_task_up_to_date(task).await? {
            self.logger
                .info(&format!("task: Task \"{}\" is up to date", task.name()));
            return Ok(());
        }

        let cache = TemplateCache::for_task(task);
        let (out, err, closer) =
            self.style
                .wrap_writer(&self.stdout, &self.stderr, task.name(), &cache)?;

        let result = self.run_cmds(task, &cache, out, err, held, depth).await;
        if result.is_err() {
            if let Err(err) = self.fingerprinter.on_error(task) {
                warn!(task = %task.task, error = %err, "failed to discard fingerprint state");
            }
        }

        match (closer.close(&result), result) {
            (Ok(()), result) => result,
            (Err(err), Ok(())) => Err(err.into()),
            (Err(err), Err(failure)) => {
                warn!(task = %task.task, error = %err, "failed to flush task output");
                Err(failure)
            }
        }
    }

    async fn run_cmds(
        &self,
        task: &Task,
        cache: &TemplateCache,
        out: OutputWriter,
        mut err: OutputWriter,
        held: &[String],
        depth: usize,
    ) -> Result<(), ExecuteError> {
        let env = env::get(task);

        for cmd in &task.cmds {
            let command = match cmd {
                Cmd::Task(name) => {
                    self.call(name, held, depth + 1).await?;
                    continue;
                }
                Cmd::Command(command) => {
                    cache
                        .replace(command)
                        .map_err(|source| ExecuteError::Template {
                            task: task.task.clone(),
                            source,
                        })?
                }
            };

            writeln!(
                err,
                "{}",
                style(format!("task: [{}] {}", task.name(), command)).green()
            )
            .map_err(OutputError::from)?;
            if self.dry {
                continue;
            }

            let options = RunCommandOptions::new(command)
                .dir(&task.dir)
                .env(env.clone())
                .stdout(Box::new(out.clone()))
                .stderr(Box::new(err.clone()));

            self.runner
                .run_command(options)
                .await
                .map_err(|source| ExecuteError::Command {
                    task: task.task.clone(),
                    source,
                })?;
        }

        Ok(())
    }
}
