//! Destinations for rendered text.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::error::FormatError;

/// Where rendered text goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
    /// A named file, truncated unless `append` is set.
    File { path: PathBuf, append: bool },
}

impl OutputTarget {
    /// Write to `path`, replacing its contents.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            append: false,
        }
    }

    /// Append to `path`, creating it if needed.
    pub fn append(path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            append: true,
        }
    }

    /// Write `text` to this target.
    pub fn write(&self, text: &str) -> Result<(), FormatError> {
        let result = match self {
            Self::Stdout => write_all(io::stdout().lock(), text),
            Self::Stderr => write_all(io::stderr().lock(), text),
            Self::File { path, append } => OpenOptions::new()
                .create(true)
                .write(true)
                .append(*append)
                .truncate(!*append)
                .open(path)
                .and_then(|file| write_all(io::BufWriter::new(file), text)),
        };
        result.map_err(|e| FormatError::io(self.to_string(), e))?;
        tracing::debug!(output = %self, bytes = text.len(), "wrote output");
        Ok(())
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("<stdout>"),
            Self::Stderr => f.write_str("<stderr>"),
            Self::File { path, .. } => write!(f, "{}", path.display()),
        }
    }
}

fn write_all(mut writer: impl Write, text: &str) -> io::Result<()> {
    writer.write_all(text.as_bytes())?;
    writer.flush()
}
