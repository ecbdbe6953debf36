//! Core types for fmtree.
//!
//! This crate provides the data structures shared by the scraper, the
//! renderers and the analyzers: file nodes and their identities, scrape
//! configuration, sibling ordering, and tree snapshots.

mod config;
mod error;
mod node;
mod path_serde;
pub mod snapshot;
pub mod sort;
mod stats;

pub use config::{PatternMode, ScrapeConfig, ScrapeConfigBuilder};
pub use error::{ScrapeError, ScrapeWarning, WarningKind};
pub use node::{Identity, Node, NodeKind, NodeMetadata, NodeRecord, Walk};
pub use snapshot::{SnapshotError, TreeSnapshot};
pub use sort::{ByName, DottedNumeric, SiblingOrder, SortError, SortStrategy, Sorter};
pub use stats::TreeStats;
