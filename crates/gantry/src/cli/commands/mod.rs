//! CLI commands

mod init;
mod list;
mod run;
mod status;
mod summary;

pub use init::InitCommand;
pub use list::ListCommand;
pub use run::RunCommand;
pub use status::{StaleTasks, StatusCommand};
pub use summary::SummaryCommand;

use std::sync::Arc;

use gantry_core::config::{load_taskfile, load_taskfile_from_dir, temp_dir_for};
use gantry_core::{Task, Taskfile};
use gantry_tasks::{CommandRunner, FingerprintOptions, Fingerprinter, TracingLogger};

use crate::cli::Cli;

/// Load the taskfile named by `--taskfile`, or the nearest one
pub(crate) fn load(cli: &Cli) -> anyhow::Result<Taskfile> {
    let taskfile = match &cli.taskfile {
        Some(path) => load_taskfile(path)?,
        None => load_taskfile_from_dir(&std::env::current_dir()?)?,
    };
    Ok(taskfile)
}

/// Fingerprinter writing state under the taskfile's temp directory
pub(crate) fn fingerprinter(
    cli: &Cli,
    taskfile: &Taskfile,
    runner: Arc<dyn CommandRunner>,
    dry: bool,
) -> Fingerprinter {
    let options = FingerprintOptions::new()
        .temp_dir(temp_dir_for(taskfile))
        .dry(dry)
        .logger(Arc::new(TracingLogger::new(cli.verbose)));
    Fingerprinter::new(runner, options)
}

/// Look up every name (or alias), failing on the first unknown one
pub(crate) fn resolve_tasks(taskfile: &Taskfile, names: &[String]) -> anyhow::Result<Vec<Task>> {
    names
        .iter()
        .map(|name| {
            taskfile
                .get(name)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("task \"{}\" does not exist", name))
        })
        .collect()
}
