//! Run command

use std::sync::Arc;

use clap::{Args, ValueEnum};
use tracing::info;

use gantry_tasks::output::Group;
use gantry_tasks::{Executor, OutputStyle, SharedSink, ShellRunner};

use crate::cli::commands::{fingerprinter, load};
use crate::cli::output::ConsoleLogger;
use crate::cli::Cli;

/// Run tasks
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Tasks to run (e.g., build test lint)
    #[arg(required = true)]
    pub tasks: Vec<String>,

    /// Print commands without running them
    #[arg(long)]
    pub dry: bool,

    /// Run tasks even if they are up to date
    #[arg(short, long)]
    pub force: bool,

    /// Override the taskfile's output style
    #[arg(short, long)]
    pub output: Option<OutputArg>,
}

/// Output style selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    Interleaved,
    Group,
    Prefixed,
}

impl From<OutputArg> for OutputStyle {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Interleaved => Self::Interleaved,
            OutputArg::Group => Self::Group(Group::default()),
            OutputArg::Prefixed => Self::Prefixed,
        }
    }
}

impl RunCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(tasks = ?self.tasks, dry = self.dry, force = self.force, "executing run command");
        let taskfile = load(cli)?;

        let style = match self.output {
            Some(arg) => OutputStyle::from(arg),
            None => OutputStyle::from(&taskfile.config.output),
        };

        let runner = Arc::new(ShellRunner);
        let fingerprinter = Arc::new(fingerprinter(cli, &taskfile, runner.clone(), self.dry));

        let executor = Executor::new(
            taskfile,
            runner,
            fingerprinter,
            SharedSink::stdout(),
            SharedSink::stderr(),
        )
        .style(style)
        .dry(self.dry)
        .force(self.force)
        .logger(Arc::new(ConsoleLogger::new(cli.verbose, cli.quiet)));

        Arc::new(executor).run(&self.tasks).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_arg_conversion() {
        assert_eq!(OutputStyle::from(OutputArg::Prefixed), OutputStyle::Prefixed);
        assert_eq!(
            OutputStyle::from(OutputArg::Group),
            OutputStyle::Group(Group::default())
        );
    }
}
