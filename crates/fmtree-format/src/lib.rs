//! Renderers for fmtree trees.
//!
//! Every formatter implements [`Render`]: it reads a finished [`Node`] tree
//! depth-first and appends text to a buffer. None of them modify the tree, so
//! one tree can be rendered in several formats.
//!
//! | Format | Type |
//! |--------|------|
//! | indented names | [`IndentFormatter`] |
//! | `tree`-style drawing | [`TreeFormatter`] |
//! | file paths | [`FileListFormatter`] |
//! | Markdown bullets | [`MarkdownFormatter`] |
//! | Markdown with file links | [`MarkdownLinkFormatter`] |
//! | GitHub table of contents | [`GithubMarkdownFormatter`] |
//! | HTML list | [`HtmlFormatter`] |
//!
//! ```rust,no_run
//! use fmtree_format::{OutputTarget, Render, TreeFormatter};
//! use fmtree_scan::{ScrapeConfig, scrape};
//!
//! let tree = scrape(ScrapeConfig::new("docs"), []).unwrap();
//! let text = TreeFormatter.generate(&tree).unwrap();
//! OutputTarget::Stdout.write(&text).unwrap();
//! ```

mod error;
mod formatter;
mod html;
mod markdown;
mod output;
mod render;
mod text;

pub use error::FormatError;
pub use formatter::{FormatKind, Formatter};
pub use html::HtmlFormatter;
pub use markdown::{
    DirLinkMode, GithubMarkdownFormatter, GithubOptions, GithubOptionsBuilder, MarkdownFormatter,
    MarkdownLinkFormatter, README,
};
pub use output::OutputTarget;
pub use render::Render;
pub use text::{FileListFormatter, IndentFormatter, TreeFormatter};

pub use fmtree_core::Node;
