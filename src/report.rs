use crate::error::Error;
use std::io::{self, Stderr, Write};

/// Messages for the human running the tool. Goes to stderr so that stdout carries nothing but the function output.
pub struct Diagnostics<W: Write> {
    writer: W,
    /// Advisories are printed in bold if TRUE
    styled: bool,
}

impl Diagnostics<Stderr> {
    /// Writes to stderr, with bold advisories if stderr is a terminal that supports styling.
    pub fn stderr() -> Self {
        Self::new(io::stderr(), console::colors_enabled_stderr())
    }
}

impl<W: Write> Diagnostics<W> {
    pub fn new(writer: W, styled: bool) -> Self {
        Self { writer, styled }
    }

    /// Prints a one-line advisory, e.g. a section header.
    pub fn advise(&mut self, msg: &str) -> Result<(), Error> {
        let line = if self.styled {
            console::style(msg).bold().force_styling(true).to_string()
        } else {
            msg.to_string()
        };

        writeln!(self.writer, "{line}").map_err(|e| Error::io("writing diagnostics", e))
    }

    /// Prints a block of text as-is followed by a newline, e.g. the function log.
    pub fn text(&mut self, text: &[u8]) -> Result<(), Error> {
        self.writer
            .write_all(text)
            .and_then(|_| self.writer.write_all(b"\n"))
            .and_then(|_| self.writer.flush())
            .map_err(|e| Error::io("writing diagnostics", e))
    }

    /// Returns the underlying writer, mostly useful for inspecting what was printed.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
