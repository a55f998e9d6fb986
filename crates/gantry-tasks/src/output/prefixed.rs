//! Line-prefixed output

use std::io;

use console::style;

use super::SharedSink;

/// Splits a stream into lines and writes each as `[prefix] line`
pub(super) struct PrefixedLines {
    prefix: String,
    partial: Vec<u8>,
    sink: SharedSink,
}

impl PrefixedLines {
    pub(super) fn new(prefix: &str, sink: SharedSink) -> Self {
        Self {
            prefix: format!("{} ", style(format!("[{}]", prefix)).cyan()),
            partial: Vec::new(),
            sink,
        }
    }

    pub(super) fn push(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.partial.extend_from_slice(buf);

        while let Some(pos) = self.partial.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.partial.drain(..=pos).collect();
            self.emit(&line)?;
        }

        Ok(buf.len())
    }

    /// Write out a trailing line that never got its newline
    pub(super) fn finish(&mut self) -> io::Result<()> {
        if self.partial.is_empty() {
            return Ok(());
        }

        let mut line = std::mem::take(&mut self.partial);
        line.push(b'\n');
        self.emit(&line)
    }

    fn emit(&self, line: &[u8]) -> io::Result<()> {
        let mut block = Vec::with_capacity(self.prefix.len() + line.len());
        block.extend_from_slice(self.prefix.as_bytes());
        block.extend_from_slice(line);
        self.sink.write_block(&block)
    }
}
