//! Test doubles shared by unit tests

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::runner::{CommandError, CommandRunner, RunCommandOptions};

/// Command runner that records invocations instead of spawning processes
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<String>>,
    failing: HashSet<String>,
    broken: HashSet<String>,
    delays: HashMap<String, Duration>,
}

impl RecordingRunner {
    /// Make `command` exit non-zero
    pub fn failing(mut self, command: &str) -> Self {
        self.failing.insert(command.to_string());
        self
    }

    /// Make `command` fail to start
    pub fn broken(mut self, command: &str) -> Self {
        self.broken.insert(command.to_string());
        self
    }

    /// Make `command` take `delay` to finish
    pub fn delayed(mut self, command: &str, delay: Duration) -> Self {
        self.delays.insert(command.to_string(), delay);
        self
    }

    /// Commands run so far, in invocation order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run_command(&self, mut options: RunCommandOptions) -> Result<(), CommandError> {
        self.calls.lock().unwrap().push(options.command.clone());

        if let Some(delay) = self.delays.get(&options.command) {
            tokio::time::sleep(*delay).await;
        }

        if self.broken.contains(&options.command) {
            return Err(CommandError::Spawn {
                command: options.command.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "sh: not found"),
            });
        }

        if let Some(out) = options.stdout.as_mut() {
            out.write_all(format!("ran {}\n", options.command).as_bytes())
                .map_err(|source| CommandError::Io {
                    command: options.command.clone(),
                    source,
                })?;
        }

        if self.failing.contains(&options.command) {
            return Err(CommandError::Exit { code: Some(1) });
        }
        Ok(())
    }
}

/// Cloneable in-memory writer
#[derive(Debug, Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Writer that rejects every write
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosedPipe;

impl Write for ClosedPipe {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "pipe closed",
        ))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
