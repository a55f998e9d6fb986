//! Init command

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use gantry_core::config::{DEFAULT_TASKFILE, DEFAULT_TASKFILE_TEMPLATE};

use crate::cli::{output, Cli};

/// Write a starter taskfile
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing taskfile
    #[arg(short, long)]
    pub force: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, "executing init command");
        let path = match &self.output {
            Some(path) => path.clone(),
            None => std::env::current_dir()?.join(DEFAULT_TASKFILE),
        };

        if path.exists() && !self.force {
            anyhow::bail!(
                "Taskfile already exists at {}. Use --force to overwrite.",
                path.display()
            );
        }

        std::fs::write(&path, DEFAULT_TASKFILE_TEMPLATE)?;

        if !cli.quiet {
            output::success(&format!(
                "Created taskfile at {}",
                style(path.display()).cyan()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use gantry_core::config::load_taskfile;

    fn quiet_cli() -> Cli {
        Cli::parse_from(["gantry", "--quiet", "init"])
    }

    #[test]
    fn test_init_writes_loadable_taskfile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_TASKFILE);
        let cmd = InitCommand {
            force: false,
            output: Some(path.clone()),
        };
        cmd.execute(&quiet_cli()).unwrap();

        let taskfile = load_taskfile(&path).unwrap();
        assert!(!taskfile.tasks.is_empty());
    }

    #[test]
    fn test_init_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_TASKFILE);
        std::fs::write(&path, "version: '3'\n").unwrap();

        let cmd = InitCommand {
            force: false,
            output: Some(path.clone()),
        };
        assert!(cmd.execute(&quiet_cli()).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "version: '3'\n");

        let cmd = InitCommand {
            force: true,
            output: Some(path.clone()),
        };
        cmd.execute(&quiet_cli()).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            DEFAULT_TASKFILE_TEMPLATE
        );
    }
}
