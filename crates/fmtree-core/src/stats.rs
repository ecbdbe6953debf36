//! Summary statistics for a finished tree.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::node::Node;

/// Summary statistics for a scraped tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Total size of regular files in bytes.
    pub total_size: u64,
    /// Total number of files.
    pub total_files: u64,
    /// Total number of directories, the root included.
    pub total_dirs: u64,
    /// Number of nodes reached through a symbolic link.
    pub total_symlinks: u64,
    /// Maximum depth reached.
    pub max_depth: u32,
    /// Largest file (path, size).
    pub largest_file: Option<(PathBuf, u64)>,
}

impl TreeStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gather statistics over every node of `tree`.
    pub fn collect(tree: &Node) -> Self {
        let mut stats = Self::new();
        for node in tree.walk() {
            if node.is_file() {
                stats.record_file(node.path.clone(), node.size(), node.depth);
            } else if node.is_dir() {
                stats.record_dir(node.depth);
            }
            if node.is_symlink() {
                stats.total_symlinks += 1;
            }
        }
        stats
    }

    /// Update stats with a file entry.
    pub fn record_file(&mut self, path: PathBuf, size: u64, depth: u32) {
        self.total_files += 1;
        self.total_size += size;
        self.max_depth = self.max_depth.max(depth);

        if self.largest_file.as_ref().is_none_or(|(_, s)| size > *s) {
            self.largest_file = Some((path, size));
        }
    }

    /// Record a directory.
    pub fn record_dir(&mut self, depth: u32) {
        self.total_dirs += 1;
        self.max_depth = self.max_depth.max(depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Identity, NodeMetadata};
    use std::path::Path;

    #[test]
    fn test_tree_stats_default() {
        let stats = TreeStats::default();
        assert_eq!(stats.total_size, 0);
        assert_eq!(stats.total_files, 0);
        assert_eq!(stats.total_dirs, 0);
    }

    #[test]
    fn test_collect() {
        let root = Path::new("/r");
        let make = |rel: &str, depth: u32, meta: NodeMetadata| {
            Node::new(root.join(rel), depth, Some(root), meta, Identity::new(0, 0)).unwrap()
        };
        let tree = make("", 0, NodeMetadata::directory()).with_children(vec![
            make("a", 1, NodeMetadata::directory())
                .with_children(vec![make("a/big.bin", 2, NodeMetadata::file(2048))]),
            make("small.txt", 1, NodeMetadata::file(3)),
        ]);

        let stats = TreeStats::collect(&tree);
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.total_dirs, 2);
        assert_eq!(stats.total_size, 2051);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(
            stats.largest_file,
            Some((PathBuf::from("/r/a/big.bin"), 2048))
        );
    }
}
