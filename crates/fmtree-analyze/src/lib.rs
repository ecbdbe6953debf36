//! Analysis passes over scraped fmtree trees.
//!
//! # Duplicate Detection
//!
//! Finds byte-identical regular files with a three-phase algorithm:
//!
//! 1. Group files by size (instant)
//! 2. Compute partial hash (first + last 4KB) for size-matched files
//! 3. Compute full BLAKE3 hash for partial-hash matches
//!
//! Hashing runs on a fixed-size worker pool.
//!
//! ```rust,no_run
//! use fmtree_analyze::{DuplicateConfig, DuplicateFinder};
//! use fmtree_scan::{Filter, ScrapeConfig, scrape};
//!
//! let tree = scrape(ScrapeConfig::new("/path/to/photos"), [Filter::image()]).unwrap();
//!
//! let config = DuplicateConfig::builder().num_workers(4usize).build().unwrap();
//! let report = DuplicateFinder::with_config(config).find_duplicates(&tree).unwrap();
//!
//! println!("Found {} duplicate groups", report.group_count);
//! println!("Wasted space: {} bytes", report.total_wasted_space);
//! ```

mod duplicates;

pub use duplicates::{
    ContentHash, DuplicateConfig, DuplicateConfigBuilder, DuplicateError, DuplicateFinder,
    DuplicateGroup, DuplicateReport, default_workers,
};

// Re-export core types
pub use fmtree_core::Node;
