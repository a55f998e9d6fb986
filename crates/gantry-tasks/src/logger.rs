//! Diagnostic logging capability
//!
//! Components that emit user-facing diagnostics (status probe results,
//! checksum decisions) take an `Arc<dyn Logger>` at construction instead of
//! reaching for a global.

use std::sync::Mutex;

/// Severity of a diagnostic line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Only shown when verbose output is requested
    Verbose,
    Info,
    Warn,
    Error,
}

/// Sink for severity-leveled diagnostics
pub trait Logger: Send + Sync {
    /// Handle a diagnostic line
    fn log(&self, level: Level, message: &str);

    fn verbose(&self, message: &str) {
        self.log(Level::Verbose, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}

/// Logger that forwards to tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger {
    verbose: bool,
}

impl TracingLogger {
    /// Create a logger; verbose lines are dropped unless `verbose` is set
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::Verbose => {
                if self.verbose {
                    tracing::debug!("{}", message);
                }
            }
            Level::Info => tracing::info!("{}", message),
            Level::Warn => tracing::warn!("{}", message),
            Level::Error => tracing::error!("{}", message),
        }
    }
}

/// Logger that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: Level, _message: &str) {}
}

/// Logger that collects lines for later inspection (useful for testing)
#[derive(Debug, Default)]
pub struct CollectingLogger {
    lines: Mutex<Vec<(Level, String)>>,
}

impl CollectingLogger {
    /// Get all collected lines
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Collected lines at exactly `level`
    pub fn at(&self, level: Level) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, line)| line)
            .collect()
    }
}

impl Logger for CollectingLogger {
    fn log(&self, level: Level, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_collecting_logger() {
        let logger = CollectingLogger::default();
        logger.verbose("probe passed");
        logger.warn("probe failed");

        assert_eq!(logger.lines().len(), 2);
        assert_eq!(logger.at(Level::Verbose), vec!["probe passed"]);
        assert_eq!(logger.at(Level::Warn), vec!["probe failed"]);
        assert!(logger.at(Level::Error).is_empty());
    }

    #[test]
    fn test_tracing_logger() {
        // Just verify it doesn't panic with or without a subscriber
        let logger = TracingLogger::new(true);
        logger.verbose("status command exited zero");
        logger.error("boom");
        TracingLogger::default().verbose("dropped");
    }

    #[test]
    fn test_logger_as_trait_object() {
        let collecting = Arc::new(CollectingLogger::default());
        let logger: Arc<dyn Logger> = collecting.clone();
        logger.info("hello");
        NullLogger.info("ignored");

        assert_eq!(collecting.at(Level::Info), vec!["hello"]);
    }

    #[test]
    fn test_level_ordering() {
        assert!(Level::Verbose < Level::Info);
        assert!(Level::Warn < Level::Error);
    }
}
