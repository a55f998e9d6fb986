//! Shell command execution

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::debug;

/// Writer that receives a command's output
pub type BoxWriter = Box<dyn Write + Send>;

/// A command to run and where to send its output
pub struct RunCommandOptions {
    /// Shell command line
    pub command: String,
    /// Working directory; empty means the current directory
    pub dir: PathBuf,
    /// Extra environment bindings layered on the inherited environment
    pub env: Vec<(String, String)>,
    /// Destination for stdout; discarded when absent
    pub stdout: Option<BoxWriter>,
    /// Destination for stderr; discarded when absent
    pub stderr: Option<BoxWriter>,
}

impl RunCommandOptions {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            dir: PathBuf::new(),
            env: Vec::new(),
            stdout: None,
            stderr: None,
        }
    }

    pub fn dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }

    pub fn stdout(mut self, writer: BoxWriter) -> Self {
        self.stdout = Some(writer);
        self
    }

    pub fn stderr(mut self, writer: BoxWriter) -> Self {
        self.stderr = Some(writer);
        self
    }
}

impl fmt::Debug for RunCommandOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunCommandOptions")
            .field("command", &self.command)
            .field("dir", &self.dir)
            .field("env", &self.env)
            .field("stdout", &self.stdout.is_some())
            .field("stderr", &self.stderr.is_some())
            .finish()
    }
}

/// Command execution errors
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The command ran and exited unsuccessfully
    #[error("{}", exit_description(.code))]
    Exit { code: Option<i32> },

    /// The command could not be started
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// IO failure while the command was running
    #[error("IO error while running `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl CommandError {
    /// Whether the command ran to completion with a non-zero status
    pub fn is_exit(&self) -> bool {
        matches!(self, Self::Exit { .. })
    }
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Executes shell commands on behalf of tasks
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion.
    ///
    /// Returns [`CommandError::Exit`] when the command exits non-zero and
    /// another variant when it could not be run at all.
    async fn run_command(&self, options: RunCommandOptions) -> Result<(), CommandError>;
}

/// Runs commands through `sh -c`
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run_command(&self, options: RunCommandOptions) -> Result<(), CommandError> {
        let RunCommandOptions {
            command,
            dir,
            env,
            stdout,
            stderr,
        } = options;
        debug!(command = %command, dir = %dir.display(), "running command");

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&command)
            .envs(env)
            .stdin(Stdio::null())
            .stdout(if stdout.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stderr(if stderr.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .kill_on_drop(true);
        if !dir.as_os_str().is_empty() {
            cmd.current_dir(&dir);
        }

        let mut child = cmd.spawn().map_err(|source| CommandError::Spawn {
            command: command.clone(),
            source,
        })?;

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        // Both pipes are drained together so neither can fill up and stall
        // the child.
        let (out_result, err_result) =
            tokio::join!(pump(stdout_pipe, stdout), pump(stderr_pipe, stderr));

        let status = child.wait().await.map_err(|source| CommandError::Io {
            command: command.clone(),
            source,
        })?;

        out_result
            .and(err_result)
            .map_err(|source| CommandError::Io {
                command: command.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            debug!(command = %command, code = ?status.code(), "command exited non-zero");
            Err(CommandError::Exit {
                code: status.code(),
            })
        }
    }
}

/// Copy everything from `reader` into `writer` as it arrives.
///
/// The pipe is read to the end even after a write fails, so the child never
/// blocks on a full pipe; the first write error is returned afterwards.
async fn pump<R>(reader: Option<R>, writer: Option<BoxWriter>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let (Some(mut reader), Some(mut writer)) = (reader, writer) else {
        return Ok(());
    };

    let mut write_error = None;
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        if write_error.is_none() {
            if let Err(err) = writer.write_all(&buf[..n]) {
                debug!(error = %err, "output writer failed, discarding the rest");
                write_error = Some(err);
            }
        }
    }

    match write_error {
        Some(err) => Err(err),
        None => writer.flush(),
    }
}
