//! Recorded tree shapes for reproducible fixtures.
//!
//! A [`TreeSnapshot`] serializes a [`Node`] tree to bytes, reads it back, and
//! can replay it onto a real filesystem as empty files and directories.

use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::node::Node;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors from writing, reading or replaying snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Filesystem failure.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding or decoding failure.
    #[error("Malformed snapshot: {0}")]
    Format(#[from] serde_json::Error),

    /// The snapshot was written by an incompatible version.
    #[error("Unsupported snapshot version {found} (expected {expected})", expected = SNAPSHOT_VERSION)]
    UnsupportedVersion { found: u32 },

    /// Replay needs every node to carry a root-relative path.
    #[error("Node {path} has no relative path; replay requires a rooted tree")]
    MissingRelativePath { path: PathBuf },
}

impl SnapshotError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A serialized tree plus capture metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSnapshot {
    /// Format version.
    pub version: u32,
    /// When the snapshot was taken.
    pub captured_at: DateTime<Utc>,
    /// The recorded tree.
    pub tree: Node,
}

impl TreeSnapshot {
    /// Capture a tree.
    pub fn new(tree: Node) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            captured_at: Utc::now(),
            tree,
        }
    }

    /// Write the snapshot to a byte stream.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), SnapshotError> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Encode the snapshot into bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Read a snapshot from a byte stream.
    pub fn read_from<R: Read>(reader: R) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_reader(reader)?;
        snapshot.check_version()
    }

    /// Decode a snapshot from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_slice(bytes)?;
        snapshot.check_version()
    }

    /// Write the snapshot to a file, replacing it.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let file = fs::File::create(path).map_err(|e| SnapshotError::io(path, e))?;
        self.write_to(std::io::BufWriter::new(file))
    }

    /// Load a snapshot from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|e| SnapshotError::io(path, e))?;
        Self::read_from(std::io::BufReader::new(file))
    }

    /// Take the recorded tree.
    pub fn into_tree(self) -> Node {
        self.tree
    }

    /// Recreate the recorded shape under `target_dir`. See [`replay_tree`].
    pub fn replay(&self, target_dir: impl AsRef<Path>) -> Result<PathBuf, SnapshotError> {
        replay_tree(target_dir.as_ref(), &self.tree)
    }

    fn check_version(self) -> Result<Self, SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
            });
        }
        Ok(self)
    }
}

/// Create `target_dir/<root name>/<relative path>` for every node of `tree`.
///
/// Directories are created, regular files are touched empty, other kinds are
/// skipped. Existing entries are left as they are. Returns the directory that
/// corresponds to the tree root.
///
/// A root name that is not a single plain component (a tree scraped at `/`,
/// an empty name, `..`) replays straight into `target_dir`.
pub fn replay_tree(target_dir: &Path, tree: &Node) -> Result<PathBuf, SnapshotError> {
    fs::create_dir_all(target_dir).map_err(|e| SnapshotError::io(target_dir, e))?;
    let base = match root_component(tree) {
        Some(name) => target_dir.join(name),
        None => {
            tracing::debug!(name = %tree.name, "root name is not a plain component");
            target_dir.to_path_buf()
        }
    };

    for node in tree.walk() {
        let relative = node
            .relative_path
            .as_deref()
            .ok_or_else(|| SnapshotError::MissingRelativePath {
                path: node.path.clone(),
            })?;
        let dest = if relative.as_os_str().is_empty() {
            base.clone()
        } else {
            base.join(relative)
        };

        if node.is_dir() {
            fs::create_dir_all(&dest).map_err(|e| SnapshotError::io(&dest, e))?;
        } else if node.is_file() {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|e| SnapshotError::io(parent, e))?;
            }
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&dest)
                .map_err(|e| SnapshotError::io(&dest, e))?;
        }
    }

    tracing::debug!(base = %base.display(), "replayed snapshot");
    Ok(base)
}

/// The root's file name, if it names exactly one normal path component.
fn root_component(tree: &Node) -> Option<&std::ffi::OsStr> {
    let name = tree.path.file_name()?;
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) => Some(part),
        _ => None,
    }
}
