//! Closed set of the provided renderers.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use fmtree_core::Node;

use crate::error::FormatError;
use crate::html::HtmlFormatter;
use crate::markdown::{
    GithubMarkdownFormatter, GithubOptions, MarkdownFormatter, MarkdownLinkFormatter,
};
use crate::render::Render;
use crate::text::{FileListFormatter, IndentFormatter, TreeFormatter};

/// Name of an output format, as accepted on the command line.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum FormatKind {
    /// Tab-indented names.
    Indent,
    /// `tree`-style box drawing.
    #[default]
    Tree,
    /// Absolute file paths.
    FileList,
    /// Markdown bullets.
    Markdown,
    /// Markdown bullets with file links.
    MarkdownLink,
    /// README-aware Markdown for GitHub.
    Github,
    /// Nested HTML list.
    Html,
}

/// Any of the provided renderers.
#[derive(Debug, Clone)]
pub enum Formatter {
    Indent(IndentFormatter),
    Tree(TreeFormatter),
    FileList(FileListFormatter),
    Markdown(MarkdownFormatter),
    MarkdownLink(MarkdownLinkFormatter),
    Github(GithubMarkdownFormatter),
    Html(HtmlFormatter),
}

impl Formatter {
    /// The default-configured renderer for `kind`.
    pub fn new(kind: FormatKind) -> Self {
        match kind {
            FormatKind::Indent => Self::Indent(IndentFormatter::default()),
            FormatKind::Tree => Self::Tree(TreeFormatter),
            FormatKind::FileList => Self::FileList(FileListFormatter),
            FormatKind::Markdown => Self::Markdown(MarkdownFormatter),
            FormatKind::MarkdownLink => Self::MarkdownLink(MarkdownLinkFormatter),
            FormatKind::Github => Self::Github(GithubMarkdownFormatter::default()),
            FormatKind::Html => Self::Html(HtmlFormatter),
        }
    }

    /// A GitHub renderer with explicit options.
    pub fn github(options: GithubOptions) -> Self {
        Self::Github(GithubMarkdownFormatter::new(options))
    }

    /// Which format this renderer produces.
    pub fn kind(&self) -> FormatKind {
        match self {
            Self::Indent(_) => FormatKind::Indent,
            Self::Tree(_) => FormatKind::Tree,
            Self::FileList(_) => FormatKind::FileList,
            Self::Markdown(_) => FormatKind::Markdown,
            Self::MarkdownLink(_) => FormatKind::MarkdownLink,
            Self::Github(_) => FormatKind::Github,
            Self::Html(_) => FormatKind::Html,
        }
    }
}

impl From<FormatKind> for Formatter {
    fn from(kind: FormatKind) -> Self {
        Self::new(kind)
    }
}

impl Render for Formatter {
    fn render(&self, tree: &Node, out: &mut String) -> Result<(), FormatError> {
        match self {
            Self::Indent(f) => f.render(tree, out),
            Self::Tree(f) => f.render(tree, out),
            Self::FileList(f) => f.render(tree, out),
            Self::Markdown(f) => f.render(tree, out),
            Self::MarkdownLink(f) => f.render(tree, out),
            Self::Github(f) => f.render(tree, out),
            Self::Html(f) => f.render(tree, out),
        }
    }
}
