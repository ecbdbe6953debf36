//! File and directory node types.

use std::fmt;
use std::fs::Metadata;
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::ScrapeError;

/// Filesystem-unique key for an entry, used for cycle and hardlink detection.
///
/// Two identities are equal iff both the device and the inode match. The
/// value is only meaningful while the underlying file exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Device ID.
    pub device: u64,
    /// Inode number.
    pub inode: u64,
}

impl Identity {
    /// Create an identity from raw components.
    pub fn new(device: u64, inode: u64) -> Self {
        Self { device, inode }
    }

    /// Compute the identity of a live path, following symlinks.
    ///
    /// Fails with [`ScrapeError::NotFound`] if the path no longer exists.
    pub fn compute(path: impl AsRef<Path>) -> Result<Self, ScrapeError> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|e| ScrapeError::io(path, e))?;
        Ok(Self::from_metadata(path, &metadata))
    }

    /// Derive the identity from metadata that was already fetched for `path`.
    #[cfg(unix)]
    pub fn from_metadata(_path: &Path, metadata: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self::new(metadata.dev(), metadata.ino())
    }

    /// Derive the identity from metadata that was already fetched for `path`.
    ///
    /// Without inode numbers the canonical path stands in for the inode.
    #[cfg(not(unix))]
    pub fn from_metadata(path: &Path, _metadata: &Metadata) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let mut hasher = DefaultHasher::new();
        canonical.hash(&mut hasher);
        Self::new(0, hasher.finish())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.device, self.inode)
    }
}

/// Type of file system node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link that was not resolved.
    Symlink,
    /// Other file types (sockets, devices, fifos).
    Other,
}

impl NodeKind {
    /// Classify a file type.
    pub fn from_file_type(file_type: std::fs::FileType) -> Self {
        if file_type.is_dir() {
            NodeKind::Directory
        } else if file_type.is_file() {
            NodeKind::File
        } else if file_type.is_symlink() {
            NodeKind::Symlink
        } else {
            NodeKind::Other
        }
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, NodeKind::Directory)
    }

    /// Check if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, NodeKind::File)
    }

    /// Check if this is a symlink.
    pub fn is_symlink(&self) -> bool {
        matches!(self, NodeKind::Symlink)
    }
}

/// Stat data cached on a node at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// Size in bytes as reported by stat.
    pub size: u64,
    /// Raw mode bits (0 where the platform has none).
    pub mode: u32,
    /// Classification of the (followed) entry.
    pub kind: NodeKind,
    /// Whether the path itself is a symlink.
    pub symlink: bool,
}

impl NodeMetadata {
    /// Build from followed metadata; `symlink` comes from the unfollowed stat.
    pub fn from_metadata(metadata: &Metadata, symlink: bool) -> Self {
        Self {
            size: metadata.len(),
            mode: mode_bits(metadata),
            kind: NodeKind::from_file_type(metadata.file_type()),
            symlink,
        }
    }

    /// Metadata for a regular file of the given size.
    pub fn file(size: u64) -> Self {
        Self {
            size,
            mode: 0o100644,
            kind: NodeKind::File,
            symlink: false,
        }
    }

    /// Metadata for a directory.
    pub fn directory() -> Self {
        Self {
            size: 0,
            mode: 0o040755,
            kind: NodeKind::Directory,
            symlink: false,
        }
    }
}

#[cfg(unix)]
fn mode_bits(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
fn mode_bits(_metadata: &Metadata) -> u32 {
    0
}

/// A single file or directory in a scraped tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Absolute path of the entry.
    #[serde(with = "crate::path_serde")]
    pub path: PathBuf,

    /// Final path component.
    pub name: CompactString,

    /// Distance from the scrape root (root = 0).
    pub depth: u32,

    /// Path the traversal started from, if any.
    #[serde(with = "crate::path_serde::option")]
    pub root: Option<PathBuf>,

    /// `path` with the `root` prefix removed. Set iff `root` is set.
    #[serde(with = "crate::path_serde::option")]
    pub relative_path: Option<PathBuf>,

    /// Cached stat data.
    pub metadata: NodeMetadata,

    /// Device + inode key.
    pub identity: Identity,

    /// Children in display order. Always empty for files.
    pub children: Vec<Node>,
}

impl Node {
    /// Create a node from already-known metadata.
    ///
    /// Fails with [`ScrapeError::OutsideRoot`] when `root` is given but is
    /// not a prefix of `path`.
    pub fn new(
        path: impl Into<PathBuf>,
        depth: u32,
        root: Option<&Path>,
        metadata: NodeMetadata,
        identity: Identity,
    ) -> Result<Self, ScrapeError> {
        let path = path.into();
        let relative_path = match root {
            Some(root) => Some(
                path.strip_prefix(root)
                    .map_err(|_| ScrapeError::OutsideRoot {
                        path: path.clone(),
                        root: root.to_path_buf(),
                    })?
                    .to_path_buf(),
            ),
            None => None,
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        Ok(Self {
            name: name.into(),
            depth,
            root: root.map(Path::to_path_buf),
            relative_path,
            metadata,
            identity,
            children: Vec::new(),
            path,
        })
    }

    /// Stat a live path and create a node for it.
    pub fn from_path(
        path: impl Into<PathBuf>,
        depth: u32,
        root: Option<&Path>,
    ) -> Result<Self, ScrapeError> {
        let path = path.into();
        let symlink = std::fs::symlink_metadata(&path)
            .map_err(|e| ScrapeError::io(&path, e))?
            .file_type()
            .is_symlink();
        let metadata = std::fs::metadata(&path).map_err(|e| ScrapeError::io(&path, e))?;
        let identity = Identity::from_metadata(&path, &metadata);
        Self::new(
            path,
            depth,
            root,
            NodeMetadata::from_metadata(&metadata, symlink),
            identity,
        )
    }

    /// Replace the children, returning the node.
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Check if this node is a directory.
    pub fn is_dir(&self) -> bool {
        self.metadata.kind.is_dir()
    }

    /// Check if this node is a regular file.
    pub fn is_file(&self) -> bool {
        self.metadata.kind.is_file()
    }

    /// Check if the path of this node is a symlink.
    pub fn is_symlink(&self) -> bool {
        self.metadata.symlink || self.metadata.kind.is_symlink()
    }

    /// Size in bytes from the cached stat.
    pub fn size(&self) -> u64 {
        self.metadata.size
    }

    /// Get the number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Depth-first, parent-before-children iterator over this subtree.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Regular files of this subtree in traversal order.
    pub fn files(&self) -> impl Iterator<Item = &Node> {
        self.walk().filter(|node| node.is_file())
    }

    /// Compare filenames, depths, relative paths and child ordering.
    pub fn same_shape(&self, other: &Node) -> bool {
        self.name == other.name
            && self.depth == other.depth
            && self.relative_path == other.relative_path
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.same_shape(b))
    }

    /// Convert this subtree into a nested key/value record.
    pub fn to_record(&self) -> NodeRecord {
        NodeRecord {
            id: self.identity.to_string(),
            depth: self.depth,
            filename: self.name.to_string(),
            path: self.path.to_string_lossy().into_owned(),
            relative_path: self
                .relative_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            root: self.root.as_ref().map(|p| p.to_string_lossy().into_owned()),
            children: self.children.iter().map(Node::to_record).collect(),
            st_size: self.metadata.size,
        }
    }

    /// Encode [`Node::to_record`] as JSON, pretty-printed when `indent` is set.
    pub fn to_json(&self, indent: Option<usize>) -> serde_json::Result<String> {
        self.to_record().to_json(indent)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Pre-order iterator returned by [`Node::walk`].
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Structured export of a node and its descendants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Identity string (`device:inode`).
    pub id: String,
    /// Depth relative to the root.
    pub depth: u32,
    /// Final path component.
    pub filename: String,
    /// Absolute path.
    pub path: String,
    /// Path relative to the root.
    pub relative_path: Option<String>,
    /// Root path of the traversal.
    pub root: Option<String>,
    /// Child records in tree order.
    pub children: Vec<NodeRecord>,
    /// File size in bytes.
    pub st_size: u64,
}

impl NodeRecord {
    /// Encode as JSON; `Some(n)` pretty-prints with `n` spaces per level.
    pub fn to_json(&self, indent: Option<usize>) -> serde_json::Result<String> {
        use serde::ser::Error as _;

        let Some(width) = indent else {
            return serde_json::to_string(self);
        };

        let indent = vec![b' '; width];
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
        let mut buf = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(buf).map_err(serde_json::Error::custom)
    }
}
