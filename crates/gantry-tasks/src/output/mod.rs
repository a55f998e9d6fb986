//! Output shaping for concurrently running tasks
//!
//! [`OutputStyle::wrap_writer`] hands a task a pair of writers and an
//! [`OutputCloser`]. Depending on the style the writers pass bytes straight
//! through, buffer them until close, or prefix every line with the task
//! name.

mod group;
mod prefixed;

pub use group::Group;

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::warn;

use gantry_core::config::OutputConfig;
use gantry_core::error::TemplateError;
use gantry_core::templater::Templater;

use group::GroupFlush;
use prefixed::PrefixedLines;

/// Output errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Writing to the real sink failed
    #[error("failed to write task output: {0}")]
    Io(#[from] io::Error),

    /// A begin/end marker could not be resolved
    #[error("invalid output marker: {0}")]
    Template(#[from] TemplateError),
}

/// How a task's output reaches the terminal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputStyle {
    /// Written as produced
    #[default]
    Interleaved,
    /// Buffered and written as one block on close
    Group(Group),
    /// Each line tagged with the task name
    Prefixed,
}

impl From<&OutputConfig> for OutputStyle {
    fn from(config: &OutputConfig) -> Self {
        match config {
            OutputConfig::Named(name) => match name.as_str() {
                "group" => Self::Group(Group::default()),
                "prefixed" => Self::Prefixed,
                _ => Self::Interleaved,
            },
            OutputConfig::Group { group } => Self::Group(Group {
                begin: group.begin.clone(),
                end: group.end.clone(),
                error_only: group.error_only,
            }),
        }
    }
}

impl OutputStyle {
    /// Writers for one task's stdout and stderr plus the closer that
    /// releases anything they hold back.
    ///
    /// Templates are resolved here, so a bad marker fails before the task
    /// runs rather than when its output is flushed.
    pub fn wrap_writer(
        &self,
        stdout: &SharedSink,
        stderr: &SharedSink,
        prefix: &str,
        templater: &dyn Templater,
    ) -> Result<(OutputWriter, OutputWriter, OutputCloser), OutputError> {
        match self {
            Self::Interleaved => Ok((
                OutputWriter(Target::Sink(stdout.clone())),
                OutputWriter(Target::Sink(stderr.clone())),
                OutputCloser { pending: None },
            )),
            Self::Group(group) => group.wrap(stdout, templater),
            Self::Prefixed => {
                let out = Arc::new(Mutex::new(PrefixedLines::new(prefix, stdout.clone())));
                let err = Arc::new(Mutex::new(PrefixedLines::new(prefix, stderr.clone())));
                Ok((
                    OutputWriter(Target::Prefixed(out.clone())),
                    OutputWriter(Target::Prefixed(err.clone())),
                    OutputCloser {
                        pending: Some(Pending::Prefixed(out, err)),
                    },
                ))
            }
        }
    }
}

/// A real output stream shared by every task.
///
/// Writers serialise on its lock; [`SharedSink::write_block`] holds the lock
/// for a whole block so blocks from different tasks never interleave.
#[derive(Clone)]
pub struct SharedSink(Arc<Mutex<Box<dyn Write + Send>>>);

impl SharedSink {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self(Arc::new(Mutex::new(Box::new(writer))))
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Write and flush `bytes` under a single lock acquisition
    pub fn write_block(&self, bytes: &[u8]) -> io::Result<()> {
        let mut sink = lock(&self.0)?;
        sink.write_all(bytes)?;
        sink.flush()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.0)?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        lock(&self.0)?.flush()
    }
}

impl fmt::Debug for SharedSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSink").finish_non_exhaustive()
    }
}

/// Writer handed to a running task
#[derive(Clone)]
pub struct OutputWriter(Target);

#[derive(Clone)]
enum Target {
    Sink(SharedSink),
    /// One buffer shared by both streams of a group
    Buffer(Arc<Mutex<Vec<u8>>>),
    Prefixed(Arc<Mutex<PrefixedLines>>),
}

impl Write for OutputWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.0 {
            Target::Sink(sink) => sink.write(buf),
            Target::Buffer(buffer) => {
                lock(buffer)?.extend_from_slice(buf);
                Ok(buf.len())
            }
            Target::Prefixed(lines) => lock(lines)?.push(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.0 {
            Target::Sink(sink) => sink.flush(),
            Target::Buffer(_) | Target::Prefixed(_) => Ok(()),
        }
    }
}

impl fmt::Debug for OutputWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.0 {
            Target::Sink(_) => "sink",
            Target::Buffer(_) => "buffer",
            Target::Prefixed(_) => "prefixed",
        };
        f.debug_tuple("OutputWriter").field(&kind).finish()
    }
}

enum Pending {
    Group(GroupFlush),
    Prefixed(Arc<Mutex<PrefixedLines>>, Arc<Mutex<PrefixedLines>>),
}

/// Releases a task's held-back output.
///
/// Call [`OutputCloser::close`] with the task's result once it has
/// finished writing. A closer dropped without being closed flushes as if
/// the task had failed.
#[must_use = "buffered output is only written when the closer is closed"]
pub struct OutputCloser {
    pending: Option<Pending>,
}

impl OutputCloser {
    /// Flush according to the style and whether `result` is an error
    pub fn close<T, E>(mut self, result: &Result<T, E>) -> Result<(), OutputError> {
        self.finish(result.is_err())
    }

    fn finish(&mut self, failed: bool) -> Result<(), OutputError> {
        match self.pending.take() {
            None => Ok(()),
            Some(Pending::Group(group)) => group.flush(failed),
            Some(Pending::Prefixed(out, err)) => {
                lock(&out)?.finish()?;
                lock(&err)?.finish()?;
                Ok(())
            }
        }
    }
}

impl Drop for OutputCloser {
    fn drop(&mut self) {
        if self.pending.is_some() {
            if let Err(err) = self.finish(true) {
                warn!(error = %err, "failed to flush task output");
            }
        }
    }
}

impl fmt::Debug for OutputCloser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputCloser")
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> io::Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| io::Error::other("output lock poisoned"))
}
