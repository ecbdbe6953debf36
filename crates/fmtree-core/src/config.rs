//! Scrape configuration types.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ScrapeError;

/// How root-relative patterns decide which entries survive the pre-pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternMode {
    /// Keep entries that match no pattern.
    #[default]
    Ignore,
    /// Keep only entries that match at least one pattern.
    Accept,
}

impl FromStr for PatternMode {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "accept" => Ok(Self::Accept),
            other => Err(ScrapeError::InvalidConfig {
                message: format!("unknown filter mode {other:?}, expected \"ignore\" or \"accept\""),
            }),
        }
    }
}

impl fmt::Display for PatternMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignore => f.write_str("ignore"),
            Self::Accept => f.write_str("accept"),
        }
    }
}

/// Configuration for a scrape.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScrapeConfig {
    /// Root path to scrape.
    pub root: PathBuf,

    /// Keep directories in which no file survived filtering.
    #[builder(default = "false")]
    #[serde(default)]
    pub keep_empty_dirs: bool,

    /// Deepest level that is still listed (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub max_depth: Option<u32>,

    /// Resolve symbolic links; when false they are skipped.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub follow_symlinks: bool,

    /// Root-relative regular expressions for the ignore/accept pre-pass.
    #[builder(default)]
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Whether `ignore_patterns` drop or select entries.
    #[builder(default)]
    #[serde(default)]
    pub pattern_mode: PatternMode,
}

fn default_true() -> bool {
    true
}

impl ScrapeConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        Ok(())
    }
}

impl ScrapeConfig {
    /// Create a new scrape config builder.
    pub fn builder() -> ScrapeConfigBuilder {
        ScrapeConfigBuilder::default()
    }

    /// Create a simple config for scraping a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            keep_empty_dirs: false,
            max_depth: None,
            follow_symlinks: true,
            ignore_patterns: Vec::new(),
            pattern_mode: PatternMode::Ignore,
        }
    }

    /// Whether recursion stops below `depth`.
    pub fn depth_reached(&self, depth: u32) -> bool {
        self.max_depth.is_some_and(|max| depth >= max)
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self::new(".")
    }
}
