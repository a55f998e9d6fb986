//! Summary command

use clap::Args;
use tracing::info;

use gantry_tasks::summary::print_tasks;

use crate::cli::commands::{load, resolve_tasks};
use crate::cli::Cli;

/// Show task summaries
#[derive(Debug, Args)]
pub struct SummaryCommand {
    /// Tasks to summarise
    #[arg(required = true)]
    pub tasks: Vec<String>,
}

impl SummaryCommand {
    /// Execute the summary command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(tasks = ?self.tasks, "executing summary command");
        let taskfile = load(cli)?;
        resolve_tasks(&taskfile, &self.tasks)?;

        print_tasks(&mut std::io::stdout().lock(), &taskfile, &self.tasks)?;
        Ok(())
    }
}
