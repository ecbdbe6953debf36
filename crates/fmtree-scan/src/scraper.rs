//! Recursive directory scraper.

use std::fs;
use std::path::{Path, PathBuf};

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use fmtree_core::{Identity, Node, NodeMetadata, ScrapeConfig, ScrapeError, ScrapeWarning};

use crate::filter::{Candidate, Filter, FilterChain, PathFilter, PatternFilter};
use crate::identity::VisitedSet;
use crate::progress::{ProgressTracker, ScrapeProgress};

/// Depth-first scraper that builds a [`Node`] tree under one root.
///
/// Every directory listing goes through the filter chain once. Directories
/// in which no file survived are dropped unless `keep_empty_dirs` is set.
/// A single instance runs one traversal at a time; `run` takes `&mut self`.
pub struct Scraper {
    config: ScrapeConfig,
    root: PathBuf,
    chain: FilterChain,
    visited: VisitedSet,
    warnings: Vec<ScrapeWarning>,
    tree: Option<Node>,
    progress_tx: broadcast::Sender<ScrapeProgress>,
    cancel: Option<CancellationToken>,
}

impl Scraper {
    /// Create a scraper for `config.root`.
    ///
    /// Fails with [`ScrapeError::NotFound`] if the root does not exist and
    /// with [`ScrapeError::InvalidPattern`] if an ignore pattern is malformed.
    pub fn new(config: ScrapeConfig) -> Result<Self, ScrapeError> {
        let root = resolve_root(&config.root)?;

        let mut chain = FilterChain::new();
        if !config.ignore_patterns.is_empty() {
            chain.push_patterns(PatternFilter::new(
                &config.ignore_patterns,
                config.pattern_mode,
            )?);
        }

        let (progress_tx, _) = broadcast::channel(100);
        Ok(Self {
            config,
            root,
            chain,
            visited: VisitedSet::new(),
            warnings: Vec::new(),
            tree: None,
            progress_tx,
            cancel: None,
        })
    }

    /// Append content filters to the chain.
    pub fn with_filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        for filter in filters {
            self.chain.push(filter);
        }
        self
    }

    /// Abort the next directory level once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Subscribe to progress updates, one per directory listed.
    pub fn subscribe(&self) -> broadcast::Receiver<ScrapeProgress> {
        self.progress_tx.subscribe()
    }

    /// Point the scraper at a new root and discard the stored tree.
    pub fn set_root(&mut self, root: impl Into<PathBuf>) -> Result<(), ScrapeError> {
        let root = root.into();
        self.root = resolve_root(&root)?;
        self.config.root = root;
        self.tree = None;
        Ok(())
    }

    /// The canonical root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Append a content filter to the chain.
    pub fn add_filter(&mut self, filter: Filter) {
        self.chain.push(filter);
    }

    /// Append an ignore/accept pre-pass.
    pub fn add_pattern_filter(&mut self, filter: PatternFilter) {
        self.chain.push_patterns(filter);
    }

    /// The configured filter chain.
    pub fn filters(&self) -> &FilterChain {
        &self.chain
    }

    /// The scrape configuration.
    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Traverse the root and store the resulting tree.
    ///
    /// History and warnings are reset first, so running twice over an
    /// unchanged filesystem gives the same tree.
    pub fn run(&mut self) -> Result<&Node, ScrapeError> {
        self.visited.clear();
        self.warnings.clear();
        self.tree = None;
        let mut tracker = ProgressTracker::new();

        let root = Node::from_path(&self.root, 0, Some(&self.root))?;
        self.visited.visit(root.identity);

        let tree = if root.is_dir() {
            let (tree, found_any) = self.process(root, &mut tracker)?;
            tracing::debug!(found_any, "root processed");
            tree
        } else {
            tracker.record_file(root.size());
            root
        };

        let _ = self
            .progress_tx
            .send(tracker.snapshot(self.warnings.len()));
        tracing::info!(
            root = %self.root.display(),
            children = tree.child_count(),
            warnings = self.warnings.len(),
            elapsed = ?tracker.elapsed(),
            "scrape finished"
        );

        Ok(&*self.tree.insert(tree))
    }

    /// The tree from the last successful run.
    pub fn tree(&self) -> Option<&Node> {
        self.tree.as_ref()
    }

    /// Take ownership of the tree from the last successful run.
    pub fn into_tree(self) -> Option<Node> {
        self.tree
    }

    /// Entries skipped during the last run.
    pub fn warnings(&self) -> &[ScrapeWarning] {
        &self.warnings
    }

    /// Build the children of `node` and report whether any file survived
    /// anywhere below it.
    fn process(
        &mut self,
        node: Node,
        tracker: &mut ProgressTracker,
    ) -> Result<(Node, bool), ScrapeError> {
        if self.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
            return Err(ScrapeError::Interrupted);
        }
        if self.config.depth_reached(node.depth) {
            return Ok((node, false));
        }

        let listing = self.list(&node.path);
        tracker.record_dir(&node.path);
        let _ = self
            .progress_tx
            .send(tracker.snapshot(self.warnings.len()));

        let listed = listing.len();
        let survivors = self.chain.apply(&self.root, listing);
        tracing::debug!(
            path = %node.path.display(),
            listed,
            kept = survivors.len(),
            "filtered listing"
        );

        let mut children = Vec::with_capacity(survivors.len());
        let mut found_any = false;

        for candidate in survivors {
            let Some(child) = self.entry_node(candidate.path, node.depth + 1)? else {
                continue;
            };

            if child.is_dir() {
                if !self.visited.visit(child.identity) {
                    tracing::debug!(path = %child.path.display(), "already visited, skipping");
                    continue;
                }
                let (child, found) = self.process(child, tracker)?;
                found_any |= found;
                if found || self.config.keep_empty_dirs {
                    children.push(child);
                }
            } else if child.is_file() {
                self.visited.visit(child.identity);
                tracker.record_file(child.size());
                found_any = true;
                children.push(child);
            } else {
                self.warn(ScrapeWarning::special_file(&child.path));
            }
        }

        Ok((node.with_children(children), found_any))
    }

    /// Stat one listed entry. Returns `None` when it is skipped.
    fn entry_node(&mut self, path: PathBuf, depth: u32) -> Result<Option<Node>, ScrapeError> {
        let link_metadata = match fs::symlink_metadata(&path) {
            Ok(m) => m,
            Err(err) => {
                self.warn(ScrapeWarning::from_io(&path, &err));
                return Ok(None);
            }
        };

        let symlink = link_metadata.file_type().is_symlink();
        if symlink && !self.config.follow_symlinks {
            tracing::debug!(path = %path.display(), "not following symlink");
            return Ok(None);
        }

        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(_) if symlink => {
                self.warn(ScrapeWarning::broken_symlink(&path));
                return Ok(None);
            }
            Err(err) => {
                self.warn(ScrapeWarning::metadata_error(&path, &err));
                return Ok(None);
            }
        };

        let identity = Identity::from_metadata(&path, &metadata);
        let node = Node::new(
            path,
            depth,
            Some(&self.root),
            NodeMetadata::from_metadata(&metadata, symlink),
            identity,
        )?;
        Ok(Some(node))
    }

    /// List a directory, sorted by file name. Unreadable directories list as
    /// empty and leave a warning.
    fn list(&mut self, dir: &Path) -> Vec<Candidate> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                self.warn(ScrapeWarning::from_io(dir, &err));
                return Vec::new();
            }
        };

        let mut batch = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => batch.push(Candidate::from_path(entry.path())),
                Err(err) => self.warn(ScrapeWarning::read_error(dir, &err)),
            }
        }
        batch.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        batch
    }

    fn warn(&mut self, warning: ScrapeWarning) {
        tracing::warn!(
            path = %warning.path.display(),
            kind = ?warning.kind,
            "{}",
            warning.message
        );
        self.warnings.push(warning);
    }
}

/// Scrape `config.root` through `filters` and return the tree.
pub fn scrape(
    config: ScrapeConfig,
    filters: impl IntoIterator<Item = Filter>,
) -> Result<Node, ScrapeError> {
    let mut scraper = Scraper::new(config)?.with_filters(filters);
    scraper.run()?;
    scraper.into_tree().ok_or(ScrapeError::Interrupted)
}

fn resolve_root(root: &Path) -> Result<PathBuf, ScrapeError> {
    root.canonicalize().map_err(|e| ScrapeError::io(root, e))
}
