//! Grouped output

use std::sync::{Arc, Mutex};

use gantry_core::templater::Templater;

use super::{lock, OutputCloser, OutputError, OutputWriter, Pending, SharedSink, Target};

/// Buffer a task's output and write it as one block when the task ends
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    /// Marker template written before the block
    pub begin: Option<String>,
    /// Marker template written after the block
    pub end: Option<String>,
    /// Drop the block when the task succeeds
    pub error_only: bool,
}

impl Group {
    pub(super) fn wrap(
        &self,
        stdout: &SharedSink,
        templater: &dyn Templater,
    ) -> Result<(OutputWriter, OutputWriter, OutputCloser), OutputError> {
        let begin = resolve_marker(self.begin.as_deref(), templater)?;
        let end = resolve_marker(self.end.as_deref(), templater)?;

        // stdout and stderr land in the same buffer so their relative order
        // survives
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let writer = OutputWriter(Target::Buffer(buffer.clone()));

        let closer = OutputCloser {
            pending: Some(Pending::Group(GroupFlush {
                sink: stdout.clone(),
                buffer,
                begin,
                end,
                error_only: self.error_only,
            })),
        };

        Ok((writer.clone(), writer, closer))
    }
}

fn resolve_marker(
    template: Option<&str>,
    templater: &dyn Templater,
) -> Result<String, OutputError> {
    match template {
        Some(template) if !template.is_empty() => Ok(format!("{}\n", templater.replace(template)?)),
        _ => Ok(String::new()),
    }
}

pub(super) struct GroupFlush {
    sink: SharedSink,
    buffer: Arc<Mutex<Vec<u8>>>,
    begin: String,
    end: String,
    error_only: bool,
}

impl GroupFlush {
    pub(super) fn flush(self, failed: bool) -> Result<(), OutputError> {
        if self.error_only && !failed {
            return Ok(());
        }

        let buffered = std::mem::take(&mut *lock(&self.buffer)?);
        if buffered.is_empty() {
            return Ok(());
        }

        let mut block = Vec::with_capacity(self.begin.len() + buffered.len() + self.end.len());
        block.extend_from_slice(self.begin.as_bytes());
        block.extend_from_slice(&buffered);
        block.extend_from_slice(self.end.as_bytes());

        self.sink.write_block(&block)?;
        Ok(())
    }
}
