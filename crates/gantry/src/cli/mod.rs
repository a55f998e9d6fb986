//! CLI definition and command handling

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{InitCommand, ListCommand, RunCommand, StatusCommand, SummaryCommand};

/// Gantry - task runner with fingerprinted up-to-date checks
#[derive(Debug, Parser)]
#[command(name = "gantry")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Taskfile to use instead of searching for one
    #[arg(short, long, global = true, env = "GANTRY_TASKFILE")]
    pub taskfile: Option<PathBuf>,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write a starter taskfile
    Init(InitCommand),

    /// List tasks
    List(ListCommand),

    /// Show task summaries
    Summary(SummaryCommand),

    /// Report whether tasks are up to date
    Status(StatusCommand),

    /// Run tasks
    Run(RunCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(&self) -> anyhow::Result<()> {
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match &self.command {
            Commands::Init(cmd) => cmd.execute(self),
            Commands::List(cmd) => cmd.execute(self),
            Commands::Summary(cmd) => cmd.execute(self),
            Commands::Status(cmd) => cmd.execute(self),
            Commands::Run(cmd) => cmd.execute(self),
        }
    }
}
