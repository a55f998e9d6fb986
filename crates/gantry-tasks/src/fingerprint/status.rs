//! Status probe checker

use std::sync::Arc;

use gantry_core::env;
use gantry_core::task::Task;

use crate::logger::Logger;
use crate::runner::{CommandRunner, RunCommandOptions};

use super::FingerprintError;

/// Decides up-to-dateness by running a task's status commands
pub struct StatusChecker {
    runner: Arc<dyn CommandRunner>,
    logger: Arc<dyn Logger>,
}

impl StatusChecker {
    pub fn new(runner: Arc<dyn CommandRunner>, logger: Arc<dyn Logger>) -> Self {
        Self { runner, logger }
    }

    /// Run each status command in order.
    ///
    /// The first command exiting non-zero makes the task stale and stops
    /// evaluation; later commands are not run. A task without status
    /// commands is reported up to date.
    pub async fn is_up_to_date(&self, task: &Task) -> Result<bool, FingerprintError> {
        let env = env::get(task);

        for status in &task.status {
            let options = RunCommandOptions::new(status)
                .dir(&task.dir)
                .env(env.clone());

            match self.runner.run_command(options).await {
                Ok(()) => {
                    self.logger
                        .verbose(&format!("task: status command {} exited zero", status));
                }
                Err(err) if err.is_exit() => {
                    self.logger.verbose(&format!(
                        "task: status command {} exited non-zero: {}",
                        status, err
                    ));
                    return Ok(false);
                }
                Err(source) => {
                    return Err(FingerprintError::Command {
                        task: task.task.clone(),
                        source,
                    });
                }
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{CollectingLogger, Level};
    use crate::testing::RecordingRunner;

    fn checker(runner: Arc<RecordingRunner>, logger: Arc<CollectingLogger>) -> StatusChecker {
        StatusChecker::new(runner, logger)
    }

    #[tokio::test]
    async fn test_no_status_commands_is_up_to_date() {
        let runner = Arc::new(RecordingRunner::default());
        let logger = Arc::new(CollectingLogger::default());
        let up = checker(runner.clone(), logger)
            .is_up_to_date(&Task::new("build"))
            .await
            .unwrap();

        assert!(up);
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_all_status_commands_pass() {
        let runner = Arc::new(RecordingRunner::default());
        let logger = Arc::new(CollectingLogger::default());
        let task = Task::new("build")
            .with_status("test -f a")
            .with_status("test -f b");

        let up = checker(runner.clone(), logger.clone())
            .is_up_to_date(&task)
            .await
            .unwrap();

        assert!(up);
        assert_eq!(runner.calls(), vec!["test -f a", "test -f b"]);
        assert_eq!(logger.at(Level::Verbose).len(), 2);
    }

    #[tokio::test]
    async fn test_first_failure_stops_evaluation() {
        let runner = Arc::new(RecordingRunner::default().failing("test -f a"));
        let logger = Arc::new(CollectingLogger::default());
        let task = Task::new("build")
            .with_status("test -f a")
            .with_status("test -f b")
            .with_status("test -f c");

        let up = checker(runner.clone(), logger.clone())
            .is_up_to_date(&task)
            .await
            .unwrap();

        assert!(!up);
        assert_eq!(runner.calls(), vec!["test -f a"]);
        let verbose = logger.at(Level::Verbose);
        assert_eq!(verbose.len(), 1);
        assert!(verbose[0].contains("exited non-zero"));
        assert!(logger.at(Level::Error).is_empty());
    }

    #[tokio::test]
    async fn test_failure_after_success() {
        let runner = Arc::new(RecordingRunner::default().failing("test -f b"));
        let logger = Arc::new(CollectingLogger::default());
        let task = Task::new("build")
            .with_status("test -f a")
            .with_status("test -f b")
            .with_status("test -f c");

        let up = checker(runner.clone(), logger)
            .is_up_to_date(&task)
            .await
            .unwrap();

        assert!(!up);
        assert_eq!(runner.calls(), vec!["test -f a", "test -f b"]);
    }

    #[tokio::test]
    async fn test_spawn_failure_is_hard_error() {
        let runner = Arc::new(RecordingRunner::default().broken("probe"));
        let logger = Arc::new(CollectingLogger::default());
        let task = Task::new("build").with_status("probe");

        let err = checker(runner, logger)
            .is_up_to_date(&task)
            .await
            .unwrap_err();

        assert!(matches!(err, FingerprintError::Command { ref task, .. } if task == "build"));
    }

    #[tokio::test]
    async fn test_real_shell_probe() {
        let logger = Arc::new(CollectingLogger::default());
        let checker = StatusChecker::new(Arc::new(crate::runner::ShellRunner), logger);

        let fresh = Task::new("fresh").with_status("true");
        let stale = Task::new("stale").with_status("false");

        assert!(checker.is_up_to_date(&fresh).await.unwrap());
        assert!(!checker.is_up_to_date(&stale).await.unwrap());
    }
}
