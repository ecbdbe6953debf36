//! Error types for scraping operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while configuring or running a scrape.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Operation was cancelled.
    #[error("Operation interrupted")]
    Interrupted,

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A regular expression failed to compile.
    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// A node path does not live under its declared root.
    #[error("{path} is not under root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
}

impl ScrapeError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Wrap a regex compile failure.
    pub fn pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }
}

/// Kind of scrape warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// Symbolic link target does not exist.
    BrokenSymlink,
    /// Error reading a directory.
    ReadError,
    /// Error reading metadata.
    MetadataError,
    /// Socket, device or fifo.
    SpecialFile,
}

/// Non-fatal problem with one entry; the entry was skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScrapeWarning {
    /// Create a new scrape warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a permission denied warning.
    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("Permission denied: {}", path.display()),
            path,
            kind: WarningKind::PermissionDenied,
        }
    }

    /// Create a broken symlink warning.
    pub fn broken_symlink(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let target = std::fs::read_link(&path)
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            message: format!("Broken symlink: {} -> {target}", path.display()),
            path,
            kind: WarningKind::BrokenSymlink,
        }
    }

    /// Create a read error warning.
    pub fn read_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::new(path, format!("Read error: {error}"), WarningKind::ReadError)
    }

    /// Create a metadata error warning.
    pub fn metadata_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::new(
            path,
            format!("Metadata error: {error}"),
            WarningKind::MetadataError,
        )
    }

    /// Create a warning for an entry that is neither file, directory nor link.
    pub fn special_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("Skipped special file: {}", path.display()),
            path,
            kind: WarningKind::SpecialFile,
        }
    }

    /// Convert a per-entry I/O error into the matching warning.
    pub fn from_io(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::read_error(path, error),
        }
    }
}
