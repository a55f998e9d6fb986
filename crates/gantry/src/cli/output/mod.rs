//! Output formatting utilities

use console::style;

use gantry_tasks::logger::{Level, Logger};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("{} {}", style("!").yellow().bold(), message);
}

/// Print an info message to stderr, keeping stdout for task output
pub fn info(message: &str) {
    eprintln!("{} {}", style("→").blue(), message);
}

/// Styled task name
pub fn task_name(name: &str) -> String {
    style(name).green().to_string()
}

/// Logger printing task diagnostics to the terminal
#[derive(Debug, Clone, Copy)]
pub struct ConsoleLogger {
    verbose: bool,
    quiet: bool,
}

impl ConsoleLogger {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::Verbose if self.verbose => info(message),
            Level::Verbose => {}
            Level::Info if !self.quiet => info(message),
            Level::Info => {}
            Level::Warn => eprintln!("{} {}", style("!").yellow().bold(), message),
            Level::Error => error(message),
        }
    }
}
