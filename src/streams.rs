use crate::error::Error;
use std::fs::File;
use std::io::{self, IsTerminal, Read, Write};

/// The path value that stands for stdin or stdout.
pub const STD_STREAM: &str = "-";

/// Where the invocation payload comes from.
pub struct Input {
    reader: Box<dyn Read>,
    /// TRUE if this is stdin attached to a terminal, i.e. someone has to type the payload
    interactive: bool,
}

impl Input {
    /// Opens stdin for `-` or the file at `path` otherwise.
    pub fn open(path: &str) -> Result<Self, Error> {
        if path == STD_STREAM {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            return Ok(Self::from_reader(stdin, interactive));
        }

        let file = File::open(path).map_err(|e| Error::io(format!("opening input file {path}"), e))?;
        Ok(Self::from_reader(file, false))
    }

    pub fn from_reader(reader: impl Read + 'static, interactive: bool) -> Self {
        Self {
            reader: Box::new(reader),
            interactive,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Reads the whole payload into memory. Nothing is sent until the input is exhausted.
    pub fn read_all(&mut self) -> Result<Vec<u8>, Error> {
        let mut payload = Vec::new();
        self.reader
            .read_to_end(&mut payload)
            .map_err(|e| Error::io("reading input", e))?;
        Ok(payload)
    }
}

/// Where the function output goes.
pub struct Output {
    writer: Box<dyn Write>,
    /// TRUE if this is stdout attached to a terminal
    interactive: bool,
}

impl Output {
    /// Opens stdout for `-` or creates / truncates the file at `path` otherwise.
    pub fn open(path: &str) -> Result<Self, Error> {
        if path == STD_STREAM {
            let stdout = io::stdout();
            let interactive = stdout.is_terminal();
            return Ok(Self::from_writer(stdout, interactive));
        }

        let file = File::create(path).map_err(|e| Error::io(format!("opening output file {path}"), e))?;
        Ok(Self::from_writer(file, false))
    }

    pub fn from_writer(writer: impl Write + 'static, interactive: bool) -> Self {
        Self {
            writer: Box::new(writer),
            interactive,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Writes the payload as-is followed by a newline.
    pub fn write_payload(&mut self, payload: &[u8]) -> Result<(), Error> {
        self.writer
            .write_all(payload)
            .and_then(|_| self.writer.write_all(b"\n"))
            .and_then(|_| self.writer.flush())
            .map_err(|e| Error::io("writing output", e))
    }
}
