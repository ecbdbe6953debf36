//! Directory scraping engine for fmtree.
//!
//! # Overview
//!
//! `fmtree-scan` walks a directory subtree and builds the [`Node`] tree the
//! renderers consume. Key features:
//!
//! - **Filter chain** applied once per directory listing
//! - **Empty-directory pruning** driven by whether any file survived below
//! - **Cycle and hardlink safety** via a per-run identity history
//! - **Progress updates** via broadcast channels
//!
//! # Example
//!
//! ```rust,no_run
//! use fmtree_scan::{Filter, ScrapeConfig, Scraper};
//!
//! let config = ScrapeConfig::new("/path/to/docs");
//! let mut scraper = Scraper::new(config).unwrap().with_filters([Filter::markdown()]);
//! let tree = scraper.run().unwrap();
//!
//! println!("{} top-level entries", tree.child_count());
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use fmtree_scan::{ScrapeConfig, Scraper};
//!
//! let mut scraper = Scraper::new(ScrapeConfig::new(".")).unwrap();
//! let mut progress_rx = scraper.subscribe();
//! scraper.run().unwrap();
//!
//! while let Ok(progress) = progress_rx.try_recv() {
//!     println!("Listed {} directories", progress.dirs_listed);
//! }
//! ```

mod filter;
mod identity;
mod progress;
mod scraper;

pub use filter::{Candidate, Filter, FilterChain, IMAGE_EXTENSIONS, PathFilter, PatternFilter};
pub use identity::VisitedSet;
pub use progress::ScrapeProgress;
pub use scraper::{Scraper, scrape};

// Re-export core types for convenience
pub use fmtree_core::{
    Identity, Node, NodeKind, PatternMode, ScrapeConfig, ScrapeError, ScrapeWarning, WarningKind,
};
