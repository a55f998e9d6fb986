//! Status command

use std::sync::Arc;

use clap::Args;
use console::style;
use tracing::info;

use gantry_tasks::listing::{apply_filters, evaluate_all, filter_out_internal, Filter, TaskRecord};
use gantry_tasks::ShellRunner;

use crate::cli::commands::{fingerprinter, load, resolve_tasks};
use crate::cli::{output, Cli};

/// Tasks reported stale by `gantry status`
#[derive(Debug, thiserror::Error)]
#[error("not up to date: {}", .0.join(", "))]
pub struct StaleTasks(pub Vec<String>);

/// Report whether tasks are up to date
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Tasks to check (default: every non-internal task)
    pub tasks: Vec<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatusCommand {
    /// Execute the status command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(tasks = ?self.tasks, "executing status command");
        let taskfile = load(cli)?;

        let tasks = if self.tasks.is_empty() {
            apply_filters(&taskfile.tasks, &[filter_out_internal as Filter])
        } else {
            resolve_tasks(&taskfile, &self.tasks)?
        };

        // dry: reporting status must not refresh stored checksums
        let fingerprinter = Arc::new(fingerprinter(cli, &taskfile, Arc::new(ShellRunner), true));
        let runtime = tokio::runtime::Runtime::new()?;
        let records = runtime
            .block_on(evaluate_all(&tasks, false, fingerprinter))
            .into_result()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&records)?);
        } else if !cli.quiet {
            print_records(&records);
        }

        let stale: Vec<String> = records
            .iter()
            .filter(|r| !r.up_to_date)
            .map(|r| r.task.clone())
            .collect();
        if !stale.is_empty() {
            return Err(StaleTasks(stale).into());
        }
        Ok(())
    }
}

fn print_records(records: &[TaskRecord]) {
    for record in records {
        if record.up_to_date {
            output::success(&format!(
                "{} {}",
                output::task_name(&record.task),
                style("up to date").dim()
            ));
        } else {
            output::warning(&format!(
                "{} {}",
                output::task_name(&record.task),
                style("stale").yellow()
            ));
        }
    }
}
