//! Plain-text renderers: indented list, `tree`-style drawing and flat file list.

use std::fmt::Write;
use std::path::PathBuf;

use itertools::{Itertools, Position};

use fmtree_core::Node;

use crate::error::FormatError;
use crate::render::Render;

/// One line per node, indented by `depth` copies of a unit string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentFormatter {
    unit: String,
}

impl IndentFormatter {
    /// Indent with a custom unit (for example four spaces).
    pub fn with_unit(unit: impl Into<String>) -> Self {
        Self { unit: unit.into() }
    }
}

impl Default for IndentFormatter {
    fn default() -> Self {
        Self::with_unit("\t")
    }
}

impl Render for IndentFormatter {
    fn render(&self, tree: &Node, out: &mut String) -> Result<(), FormatError> {
        for node in tree.walk() {
            writeln!(out, "{}{}", self.unit.repeat(node.depth as usize), node.name)?;
        }
        Ok(())
    }
}

/// Box-drawing output in the style of the `tree` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeFormatter;

impl TreeFormatter {
    /// Prefix segment below a last sibling.
    pub const SPACE: &'static str = "    ";
    /// Prefix segment below a sibling that has successors.
    pub const BRANCH: &'static str = "│   ";
    /// Pointer to a sibling that has successors.
    pub const TEE: &'static str = "├── ";
    /// Pointer to the last sibling.
    pub const LAST: &'static str = "└── ";

    fn render_children(node: &Node, prefix: &str, out: &mut String) -> Result<(), FormatError> {
        for (position, child) in node.children.iter().with_position() {
            let (pointer, extension) = match position {
                Position::Last | Position::Only => (Self::LAST, Self::SPACE),
                Position::First | Position::Middle => (Self::TEE, Self::BRANCH),
            };
            writeln!(out, "{prefix}{pointer}{}", child.name)?;
            Self::render_children(child, &format!("{prefix}{extension}"), out)?;
        }
        Ok(())
    }
}

impl Render for TreeFormatter {
    fn render(&self, tree: &Node, out: &mut String) -> Result<(), FormatError> {
        writeln!(out, "{}", tree.name)?;
        Self::render_children(tree, "", out)
    }
}

/// Absolute paths of regular files, one per line. Directories are traversed
/// but not printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileListFormatter;

impl FileListFormatter {
    /// The paths `render` prints, in the same order.
    pub fn paths(&self, tree: &Node) -> Vec<PathBuf> {
        tree.files().map(|node| node.path.clone()).collect()
    }
}

impl Render for FileListFormatter {
    fn render(&self, tree: &Node, out: &mut String) -> Result<(), FormatError> {
        for node in tree.files() {
            writeln!(out, "{}", node.path.display())?;
        }
        Ok(())
    }
}
