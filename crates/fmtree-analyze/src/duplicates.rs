//! Duplicate file detection using content hashing.
//!
//! Uses a three-phase algorithm for efficiency:
//! 1. Group files by size (instant, O(n))
//! 2. Compute partial hash for size-matched files (first + last 4KB)
//! 3. Compute full BLAKE3 hash for partial-hash matches
//!
//! Hashing runs on a dedicated pool of `num_workers` threads. Workers only
//! insert into a concurrent map; grouping happens on the calling thread.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use blake3::Hasher;
use dashmap::DashMap;
use derive_builder::Builder;
use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fmtree_core::Node;

/// Files above this size are hashed through a memory map.
const MMAP_THRESHOLD: u64 = 128 * 1024;

/// Errors from duplicate detection.
#[derive(Debug, Error)]
pub enum DuplicateError {
    /// An exclude pattern is not a valid glob.
    #[error("Invalid exclude pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// The hashing pool could not be started.
    #[error("Failed to start hashing pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Configuration for duplicate detection.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct DuplicateConfig {
    /// Minimum file size to consider. Empty files are never reported.
    #[builder(default = "1")]
    pub min_size: u64,

    /// Maximum file size to consider (skip huge files).
    #[builder(default = "u64::MAX")]
    pub max_size: u64,

    /// Use quick comparison (size + partial hash) before full hash.
    #[builder(default = "true")]
    pub quick_compare: bool,

    /// Number of bytes for partial hash from start of file.
    #[builder(default = "4096")]
    pub partial_hash_head: usize,

    /// Number of bytes for partial hash from end of file.
    #[builder(default = "4096")]
    pub partial_hash_tail: usize,

    /// Glob patterns matched against root-relative paths and file names.
    #[builder(default)]
    pub exclude_patterns: Vec<String>,

    /// Maximum number of groups to return (0 = unlimited).
    #[builder(default = "0")]
    pub max_groups: usize,

    /// Size of the hashing pool.
    #[builder(default = "default_workers()")]
    pub num_workers: usize,
}

/// All available cores but one, at least one.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1).max(1))
        .unwrap_or(1)
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            min_size: 1,
            max_size: u64::MAX,
            quick_compare: true,
            partial_hash_head: 4096,
            partial_hash_tail: 4096,
            exclude_patterns: Vec::new(),
            max_groups: 0,
            num_workers: default_workers(),
        }
    }
}

impl DuplicateConfig {
    /// Create a new config builder.
    pub fn builder() -> DuplicateConfigBuilder {
        DuplicateConfigBuilder::default()
    }
}

/// A BLAKE3 content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Wrap raw digest bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        blake3::Hash::from_bytes(self.0).to_hex().to_string()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A group of duplicate files sharing the same content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Content hash shared by all files in this group.
    pub hash: ContentHash,

    /// Size of each file in bytes.
    pub size: u64,

    /// Paths to all duplicate files, sorted.
    pub paths: Vec<PathBuf>,

    /// Wasted space: size * (count - 1).
    pub wasted_bytes: u64,
}

impl DuplicateGroup {
    fn new(hash: ContentHash, size: u64, mut paths: Vec<PathBuf>) -> Self {
        paths.sort();
        let wasted_bytes = size * (paths.len() as u64).saturating_sub(1);
        Self {
            hash,
            size,
            paths,
            wasted_bytes,
        }
    }

    /// Get the number of duplicate files.
    pub fn count(&self) -> usize {
        self.paths.len()
    }

    /// Check if keeping one file, how many could be deleted.
    pub fn deletable_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }
}

/// Results from duplicate analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuplicateReport {
    /// Groups of duplicate files, sorted by wasted space descending.
    pub groups: Vec<DuplicateGroup>,

    /// Total size of all duplicate files.
    pub total_duplicate_size: u64,

    /// Total wasted space (could be reclaimed).
    pub total_wasted_space: u64,

    /// Number of files analyzed.
    pub files_analyzed: u64,

    /// Number of files that have duplicates.
    pub files_with_duplicates: u64,

    /// Number of unique duplicate groups.
    pub group_count: usize,
}

impl DuplicateReport {
    /// Check if any duplicates were found.
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Get total number of duplicate files across all groups.
    pub fn total_duplicate_files(&self) -> usize {
        self.groups.iter().map(|g| g.paths.len()).sum()
    }
}

/// Duplicate file finder.
pub struct DuplicateFinder {
    config: DuplicateConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with default config.
    pub fn new() -> Self {
        Self {
            config: DuplicateConfig::default(),
        }
    }

    /// Create a new duplicate finder with custom config.
    pub fn with_config(config: DuplicateConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &DuplicateConfig {
        &self.config
    }

    /// Find byte-identical regular files among the files of `tree`.
    pub fn find_duplicates(&self, tree: &Node) -> Result<DuplicateReport, DuplicateError> {
        let exclude = self.exclude_set()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.num_workers.max(1))
            .thread_name(|i| format!("fmtree-hash-{i}"))
            .build()?;

        // Phase 1: Collect files within the size limits
        let files: Vec<FileInfo> = tree
            .files()
            .filter(|node| {
                let size = node.size();
                size >= self.config.min_size.max(1) && size <= self.config.max_size
            })
            .filter(|node| !is_excluded(&exclude, node))
            .map(|node| FileInfo {
                path: node.path.clone(),
                size: node.size(),
            })
            .collect();
        let files_analyzed = files.len() as u64;

        // Phase 2: Group by size
        let size_groups = group_by_size(files);
        let candidates: usize = size_groups.values().map(Vec::len).sum();
        tracing::debug!(
            files_analyzed,
            candidates,
            workers = self.config.num_workers,
            "hashing size-matched files"
        );

        // Phase 3: Hash on the pool
        let groups = pool.install(|| {
            size_groups
                .into_par_iter()
                .flat_map(|(size, files)| {
                    if self.config.quick_compare {
                        self.find_dups_partial(size, files)
                    } else {
                        self.find_dups_full(size, files)
                    }
                })
                .collect::<Vec<_>>()
        });

        Ok(self.build_report(groups, files_analyzed))
    }

    fn exclude_set(&self) -> Result<GlobSet, DuplicateError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.config.exclude_patterns {
            let glob = Glob::new(pattern).map_err(|source| DuplicateError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|source| DuplicateError::InvalidPattern {
            pattern: self.config.exclude_patterns.join(", "),
            source,
        })
    }

    fn build_report(&self, mut groups: Vec<DuplicateGroup>, files_analyzed: u64) -> DuplicateReport {
        // Sort by wasted space descending, then by first path for stable output
        groups.sort_by(|a, b| {
            b.wasted_bytes
                .cmp(&a.wasted_bytes)
                .then_with(|| a.paths.first().cmp(&b.paths.first()))
        });

        if self.config.max_groups > 0 && groups.len() > self.config.max_groups {
            groups.truncate(self.config.max_groups);
        }

        let total_duplicate_size = groups.iter().map(|g| g.size * g.paths.len() as u64).sum();
        let total_wasted_space = groups.iter().map(|g| g.wasted_bytes).sum();
        let files_with_duplicates = groups.iter().map(|g| g.paths.len() as u64).sum();
        let group_count = groups.len();

        tracing::info!(group_count, total_wasted_space, "duplicate search finished");
        DuplicateReport {
            groups,
            total_duplicate_size,
            total_wasted_space,
            files_analyzed,
            files_with_duplicates,
            group_count,
        }
    }

    /// Partial hash first, then full hash for partial matches.
    fn find_dups_partial(&self, size: u64, files: Vec<FileInfo>) -> Vec<DuplicateGroup> {
        let partial: DashMap<[u8; 32], Vec<PathBuf>> = DashMap::new();
        files.into_par_iter().for_each(|f| {
            match self.compute_partial_hash(&f.path) {
                Some(hash) => partial.entry(hash).or_default().push(f.path),
                None => tracing::warn!(path = %f.path.display(), "unreadable, skipped"),
            }
        });

        partial
            .into_iter()
            .filter(|(_, paths)| paths.len() > 1)
            .flat_map(|(_, paths)| {
                let files = paths
                    .into_iter()
                    .map(|path| FileInfo { path, size })
                    .collect();
                self.find_dups_full(size, files)
            })
            .collect()
    }

    /// Full hash of every file in a size group.
    fn find_dups_full(&self, size: u64, files: Vec<FileInfo>) -> Vec<DuplicateGroup> {
        let full: DashMap<ContentHash, Vec<PathBuf>> = DashMap::new();
        files.into_par_iter().for_each(|f| {
            match compute_full_hash(&f.path) {
                Some(hash) => full.entry(hash).or_default().push(f.path),
                None => tracing::warn!(path = %f.path.display(), "unreadable, skipped"),
            }
        });

        full.into_iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|(hash, paths)| DuplicateGroup::new(hash, size, paths))
            .collect()
    }

    /// Compute a partial hash (first + last N bytes).
    fn compute_partial_hash(&self, path: &Path) -> Option<[u8; 32]> {
        let mut file = File::open(path).ok()?;
        let file_size = file.metadata().ok()?.len();

        let mut hasher = Hasher::new();

        let head_size = (self.config.partial_hash_head as u64).min(file_size);
        let mut head_buf = vec![0u8; head_size as usize];
        file.read_exact(&mut head_buf).ok()?;
        hasher.update(&head_buf);

        if file_size > head_size {
            let tail_size = (self.config.partial_hash_tail as u64).min(file_size - head_size);
            if tail_size > 0 {
                file.seek(SeekFrom::End(-(tail_size as i64))).ok()?;
                let mut tail_buf = vec![0u8; tail_size as usize];
                file.read_exact(&mut tail_buf).ok()?;
                hasher.update(&tail_buf);
            }
        }

        // Include file size in hash to differentiate files with same head/tail
        hasher.update(&file_size.to_le_bytes());

        Some(*hasher.finalize().as_bytes())
    }
}

impl Default for DuplicateFinder {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the full BLAKE3 hash of a file.
fn compute_full_hash(path: &Path) -> Option<ContentHash> {
    let mut hasher = Hasher::new();
    let file_size = std::fs::metadata(path).ok()?.len();

    if file_size > MMAP_THRESHOLD {
        hasher.update_mmap(path).ok()?;
    } else {
        let mut file = File::open(path).ok()?;
        let mut buffer = vec![0u8; 64 * 1024];
        loop {
            let bytes_read = file.read(&mut buffer).ok()?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }
    }

    Some(ContentHash::new(*hasher.finalize().as_bytes()))
}

fn is_excluded(exclude: &GlobSet, node: &Node) -> bool {
    if exclude.is_empty() {
        return false;
    }
    exclude.is_match(node.name.as_str())
        || node
            .relative_path
            .as_deref()
            .is_some_and(|rel| exclude.is_match(rel))
}

fn group_by_size(files: Vec<FileInfo>) -> HashMap<u64, Vec<FileInfo>> {
    let mut groups: HashMap<u64, Vec<FileInfo>> = HashMap::new();
    for file in files {
        groups.entry(file.size).or_default().push(file);
    }
    // Remove groups with only one file
    groups.retain(|_, v| v.len() > 1);
    groups
}

#[derive(Debug, Clone)]
struct FileInfo {
    path: PathBuf,
    size: u64,
}
