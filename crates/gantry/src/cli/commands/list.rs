//! List command

use std::io::Write;
use std::sync::Arc;

use clap::Args;
use tracing::info;

use gantry_tasks::listing::{self, apply_filters, write_task_list, ListOptions};
use gantry_tasks::ShellRunner;

use crate::cli::commands::{fingerprinter, load};
use crate::cli::Cli;

/// List tasks
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Include tasks without a description
    #[arg(short, long)]
    pub all: bool,

    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,

    /// Skip up-to-date evaluation in JSON output
    #[arg(long)]
    pub no_status: bool,

    /// Print only task names and aliases
    #[arg(long, conflicts_with = "json")]
    pub names: bool,
}

impl ListCommand {
    fn options(&self) -> ListOptions {
        ListOptions {
            list: !self.all,
            list_all: self.all,
            json: self.json,
            no_status: self.no_status,
        }
    }

    /// Execute the list command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(all = self.all, json = self.json, "executing list command");
        let taskfile = load(cli)?;
        let options = self.options();
        let mut stdout = std::io::stdout().lock();

        if self.names {
            listing::list_task_names(&mut stdout, &taskfile.tasks, self.all)?;
            return Ok(());
        }

        let tasks = apply_filters(&taskfile.tasks, &options.filters());

        if options.json {
            let fingerprinter = Arc::new(fingerprinter(cli, &taskfile, Arc::new(ShellRunner), false));
            let runtime = tokio::runtime::Runtime::new()?;
            let output = runtime.block_on(listing::to_listing(
                &taskfile.location,
                &tasks,
                options.no_status,
                fingerprinter,
            ))?;

            writeln!(stdout, "{}", serde_json::to_string_pretty(&output)?)?;
            return Ok(());
        }

        write_task_list(&mut stdout, &tasks, &options)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_flags() {
        let cmd = ListCommand {
            all: false,
            json: true,
            no_status: true,
            names: false,
        };
        let options = cmd.options();
        assert!(options.list && !options.list_all);
        assert!(options.json && options.no_status);
        assert!(options.should_list_tasks());
    }
}
