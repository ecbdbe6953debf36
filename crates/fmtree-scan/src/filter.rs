//! Per-directory filters.
//!
//! Filters see the whole listing of one directory at a time and return the
//! survivors in their original order. Content filters never drop
//! directories, so descent continues and empty branches are pruned later by
//! the scraper. The root-relative ignore/accept pre-pass in
//! [`PatternFilter`] is the one stage that may drop directories.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use regex::Regex;

use fmtree_core::{PatternMode, ScrapeError};

/// Extensions treated as images by [`Filter::image`].
pub const IMAGE_EXTENSIONS: &[&str] = &[
    ".apng", ".avif", ".gif", ".jpg", ".jpeg", ".jfif", ".pjpeg", ".pjp", ".png", ".svg", ".webp",
    ".bmp", ".ico", ".cur", ".tif", ".tiff",
];

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Full path of the entry.
    pub path: PathBuf,
    /// Whether the entry (or its symlink target) is a directory.
    pub is_dir: bool,
}

impl Candidate {
    /// Create a candidate with a known directory flag.
    pub fn new(path: impl Into<PathBuf>, is_dir: bool) -> Self {
        Self {
            path: path.into(),
            is_dir,
        }
    }

    /// Create a candidate by asking the filesystem whether `path` is a directory.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_dir = path.is_dir();
        Self { path, is_dir }
    }

    /// Final component of the path.
    pub fn file_name(&self) -> Cow<'_, str> {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default()
    }
}

/// A stage that narrows one directory listing.
pub trait PathFilter {
    /// Return the subset of `batch` to keep, preserving order.
    fn apply(&self, root: &Path, batch: Vec<Candidate>) -> Vec<Candidate>;
}

/// Content filters. Directories always pass.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Keep files whose name ends with one of the suffixes.
    Extension { extensions: Vec<String> },
    /// Keep files whose full path matches one of the patterns at its start.
    Regex { patterns: Vec<Regex> },
    /// Keep `.md` files.
    Markdown,
}

impl Filter {
    /// Match filenames against literal suffixes (include the dot: `".md"`).
    pub fn extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Extension {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    /// Extension filter over [`IMAGE_EXTENSIONS`].
    pub fn image() -> Self {
        Self::extensions(IMAGE_EXTENSIONS.iter().copied())
    }

    /// Compile path patterns; each must match a prefix of the path string.
    pub fn regex<I, S>(patterns: I) -> Result<Self, ScrapeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::Regex {
            patterns: compile_prefix_patterns(patterns)?,
        })
    }

    /// Keep markdown files only.
    pub fn markdown() -> Self {
        Self::Markdown
    }

    /// Decide a single candidate.
    pub fn keeps(&self, candidate: &Candidate) -> bool {
        if candidate.is_dir {
            return true;
        }
        match self {
            Filter::Extension { extensions } => {
                let name = candidate.file_name();
                extensions.iter().any(|ext| name.ends_with(ext.as_str()))
            }
            Filter::Regex { patterns } => {
                let path = candidate.path.to_string_lossy();
                patterns.iter().any(|p| p.is_match(&path))
            }
            Filter::Markdown => candidate.file_name().ends_with(".md"),
        }
    }
}

impl PathFilter for Filter {
    fn apply(&self, _root: &Path, batch: Vec<Candidate>) -> Vec<Candidate> {
        batch.into_iter().filter(|c| self.keeps(c)).collect()
    }
}

/// Ignore/accept pre-pass keyed by root-relative regular expressions.
#[derive(Debug, Clone)]
pub struct PatternFilter {
    patterns: Vec<Regex>,
    mode: PatternMode,
}

impl PatternFilter {
    /// Compile the patterns. Matching is anchored at the start of the
    /// root-relative path.
    pub fn new<I, S>(patterns: I, mode: PatternMode) -> Result<Self, ScrapeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            patterns: compile_prefix_patterns(patterns)?,
            mode,
        })
    }

    /// Drop entries matching any pattern.
    pub fn ignore<I, S>(patterns: I) -> Result<Self, ScrapeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(patterns, PatternMode::Ignore)
    }

    /// Keep only entries matching at least one pattern.
    pub fn accept<I, S>(patterns: I) -> Result<Self, ScrapeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(patterns, PatternMode::Accept)
    }

    /// The configured mode.
    pub fn mode(&self) -> PatternMode {
        self.mode
    }

    /// Decide a single candidate relative to `root`.
    pub fn keeps(&self, root: &Path, candidate: &Candidate) -> bool {
        let relative = candidate
            .path
            .strip_prefix(root)
            .unwrap_or(&candidate.path)
            .to_string_lossy();
        let matched = self.patterns.iter().any(|p| p.is_match(&relative));
        match self.mode {
            PatternMode::Ignore => !matched,
            PatternMode::Accept => matched,
        }
    }
}

impl PathFilter for PatternFilter {
    fn apply(&self, root: &Path, batch: Vec<Candidate>) -> Vec<Candidate> {
        batch.into_iter().filter(|c| self.keeps(root, c)).collect()
    }
}

/// Ordered composition of filters.
///
/// Pattern pre-passes always run first, in insertion order, followed by the
/// content filters in insertion order.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    pre_passes: Vec<PatternFilter>,
    filters: Vec<Filter>,
}

impl FilterChain {
    /// Create an empty chain (keeps everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a content filter.
    pub fn push(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    /// Append an ignore/accept pre-pass.
    pub fn push_patterns(&mut self, filter: PatternFilter) {
        self.pre_passes.push(filter);
    }

    /// Builder-style [`FilterChain::push`].
    pub fn with(mut self, filter: Filter) -> Self {
        self.push(filter);
        self
    }

    /// Builder-style [`FilterChain::push_patterns`].
    pub fn with_patterns(mut self, filter: PatternFilter) -> Self {
        self.push_patterns(filter);
        self
    }

    /// Total number of stages.
    pub fn len(&self) -> usize {
        self.pre_passes.len() + self.filters.len()
    }

    /// Whether the chain has no stages.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PathFilter for FilterChain {
    fn apply(&self, root: &Path, batch: Vec<Candidate>) -> Vec<Candidate> {
        let batch = self
            .pre_passes
            .iter()
            .fold(batch, |batch, stage| stage.apply(root, batch));
        self.filters
            .iter()
            .fold(batch, |batch, stage| stage.apply(root, batch))
    }
}

fn compile_prefix_patterns<I, S>(patterns: I) -> Result<Vec<Regex>, ScrapeError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    patterns
        .into_iter()
        .map(|pattern| {
            let pattern = pattern.as_ref();
            Regex::new(&format!("^(?:{pattern})")).map_err(|e| ScrapeError::pattern(pattern, e))
        })
        .collect()
}
