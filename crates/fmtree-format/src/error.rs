//! Error types for rendering and output.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while rendering a tree or writing the result.
#[derive(Debug, Error)]
pub enum FormatError {
    /// A node is neither a file nor a directory; the tree is corrupted.
    #[error("Unexpected node kind at {path}: expected a file or a directory")]
    UnexpectedKind { path: PathBuf },

    /// Writing the rendered text failed.
    #[error("Failed to write output to {target}: {source}")]
    Io {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// Formatting into the text buffer failed.
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

impl FormatError {
    /// Create an I/O error naming the output it concerns.
    pub fn io(target: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            target: target.into(),
            source,
        }
    }
}
