//! Task listings with concurrent up-to-date evaluation

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use console::style;
use serde::{Deserialize, Serialize};
use tracing::debug;

use gantry_core::task::Task;

use crate::fingerprint::{FingerprintError, Fingerprinter};

/// Minimum gap between text listing columns
const COLUMN_PADDING: usize = 6;

/// Presentation record for one task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub name: String,
    pub task: String,
    pub desc: String,
    pub summary: String,
    /// Serialised as `[]` when the task has none
    pub aliases: Vec<String>,
    #[serde(rename = "upToDate")]
    pub up_to_date: bool,
    pub location: RecordLocation,
}

/// Where a listed task is declared
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordLocation {
    pub line: usize,
    pub column: usize,
    pub taskfile: String,
}

impl TaskRecord {
    /// Record for `task` with `up_to_date` unset
    pub fn from_task(task: &Task) -> Self {
        Self {
            name: task.name().to_string(),
            task: task.task.clone(),
            desc: task.desc.clone(),
            summary: task.summary.clone(),
            aliases: task.aliases.clone(),
            up_to_date: false,
            location: RecordLocation {
                line: task.location.line,
                column: task.location.column,
                taskfile: task.location.taskfile.display().to_string(),
            },
        }
    }
}

/// JSON listing document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskListing {
    pub tasks: Vec<TaskRecord>,
    pub location: String,
}

/// Outcome of [`evaluate_all`]: every slot populated, plus the first failure
#[derive(Debug)]
pub struct FanOut {
    /// `records[i]` describes `tasks[i]`
    pub records: Vec<TaskRecord>,
    /// First error by launch order
    pub first_error: Option<FingerprintError>,
}

impl FanOut {
    pub fn into_result(self) -> Result<Vec<TaskRecord>, FingerprintError> {
        match self.first_error {
            Some(err) => Err(err),
            None => Ok(self.records),
        }
    }
}

/// Evaluate every task concurrently, one tokio task per input.
///
/// Each unit owns a clone of its task and returns its verdict through its
/// join handle; only this function writes `records`, and slot `i` is only
/// ever written from handle `i`, so the array needs no lock. Handles are
/// drained in launch order and the first error kept. A failing unit does
/// not cancel its siblings; their slots are still filled.
///
/// With `no_status` set the fingerprinter is never called and every
/// `up_to_date` stays `false`.
pub async fn evaluate_all(
    tasks: &[Task],
    no_status: bool,
    fingerprinter: Arc<Fingerprinter>,
) -> FanOut {
    let mut records: Vec<TaskRecord> = tasks.iter().map(TaskRecord::from_task).collect();

    if no_status {
        return FanOut {
            records,
            first_error: None,
        };
    }

    let handles: Vec<_> = tasks
        .iter()
        .cloned()
        .map(|task| {
            let fingerprinter = fingerprinter.clone();
            tokio::spawn(async move { fingerprinter.is_task_up_to_date(&task).await })
        })
        .collect();
    debug!(count = handles.len(), "launched fingerprint evaluations");

    let mut first_error = None;
    for ((record, task), handle) in records.iter_mut().zip(tasks).zip(handles) {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(err) => Err(FingerprintError::Join {
                task: task.task.clone(),
                message: err.to_string(),
            }),
        };

        match outcome {
            Ok(up_to_date) => record.up_to_date = up_to_date,
            Err(err) => {
                debug!(task = %task.task, error = %err, "fingerprint evaluation failed");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
    }

    FanOut {
        records,
        first_error,
    }
}

/// Build the JSON listing for `tasks`
pub async fn to_listing(
    location: &Path,
    tasks: &[Task],
    no_status: bool,
    fingerprinter: Arc<Fingerprinter>,
) -> Result<TaskListing, FingerprintError> {
    let records = evaluate_all(tasks, no_status, fingerprinter)
        .await
        .into_result()?;

    Ok(TaskListing {
        tasks: records,
        location: location.display().to_string(),
    })
}

/// List-related command line options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Only tasks with a description
    pub list: bool,
    /// Every non-internal task
    pub list_all: bool,
    pub json: bool,
    pub no_status: bool,
}

/// Predicate keeping a task in a listing
pub type Filter = fn(&Task) -> bool;

impl ListOptions {
    pub fn should_list_tasks(&self) -> bool {
        self.list || self.list_all
    }

    pub fn filters(&self) -> Vec<Filter> {
        let mut filters: Vec<Filter> = vec![filter_out_internal];
        if self.list {
            filters.push(filter_out_no_desc);
        }
        filters
    }
}

pub fn filter_out_internal(task: &Task) -> bool {
    !task.internal
}

pub fn filter_out_no_desc(task: &Task) -> bool {
    !task.desc.is_empty()
}

/// Tasks passing every filter, in input order
pub fn apply_filters(tasks: &[Task], filters: &[Filter]) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| filters.iter().all(|keep| keep(task)))
        .cloned()
        .collect()
}

/// Write the human-readable listing; returns whether anything was listed
pub fn write_task_list<W: Write>(w: &mut W, tasks: &[Task], options: &ListOptions) -> io::Result<bool> {
    if tasks.is_empty() {
        if options.list {
            writeln!(
                w,
                "{}",
                style("task: No tasks with description available. Try --all to list all tasks")
                    .yellow()
            )?;
        } else if options.list_all {
            writeln!(w, "{}", style("task: No tasks available").yellow())?;
        }
        return Ok(false);
    }

    writeln!(w, "task: Available tasks for this project:")?;

    let rows: Vec<(&str, String, &[String])> = tasks
        .iter()
        .map(|task| {
            (
                task.task.as_str(),
                task.desc.replace('\n', " "),
                task.aliases.as_slice(),
            )
        })
        .collect();

    // "* " + name + ": "
    let name_width = rows.iter().map(|(name, _, _)| name.len() + 4).max().unwrap_or(0) + COLUMN_PADDING;
    let desc_width = rows
        .iter()
        .filter(|(_, _, aliases)| !aliases.is_empty())
        .map(|(_, desc, _)| desc.len())
        .max()
        .unwrap_or(0)
        + COLUMN_PADDING;

    for (name, desc, aliases) in &rows {
        write!(
            w,
            "{}{}: {}{}",
            style("* ").yellow(),
            style(name).green(),
            " ".repeat(name_width - (name.len() + 4)),
            desc
        )?;
        if !aliases.is_empty() {
            write!(
                w,
                "{}{}",
                " ".repeat(desc_width - desc.len()),
                style(format!("(aliases: {})", aliases.join(", "))).cyan()
            )?;
        }
        writeln!(w)?;
    }

    Ok(true)
}

/// Print task names and aliases, one per line
pub fn list_task_names<W: Write>(w: &mut W, tasks: &[Task], all: bool) -> io::Result<()> {
    for task in tasks {
        if task.internal || !(all || !task.desc.is_empty()) {
            continue;
        }
        writeln!(w, "{}", task.task.trim_end_matches(':'))?;
        for alias in &task.aliases {
            writeln!(w, "{}", alias.trim_end_matches(':'))?;
        }
    }
    Ok(())
}
