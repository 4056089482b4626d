//! The single place user-facing text is written.

use std::io::Write;

/// Writes messages with a decorative prefix and the OS line delimiter.
///
/// Multi-line messages get the prefix on every line.
pub struct MessagePrinter<W: Write> {
    out: W,
    prefix: String,
    delimiter: String,
}

impl<W: Write> MessagePrinter<W> {
    pub fn new(out: W, prefix: impl Into<String>, delimiter: impl Into<String>) -> Self {
        Self {
            out,
            prefix: prefix.into(),
            delimiter: delimiter.into(),
        }
    }

    pub fn print(&mut self, message: &str) -> std::io::Result<()> {
        if message.is_empty() {
            self.write_line("")?;
        }
        for line in message.lines() {
            self.write_line(line)?;
        }
        self.out.flush()
    }

    fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        if self.prefix.is_empty() {
            write!(self.out, "{}{}", line, self.delimiter)
        } else {
            write!(self.out, "{} {}{}", self.prefix, line, self.delimiter)
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
