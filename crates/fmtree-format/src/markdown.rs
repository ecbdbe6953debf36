//! Markdown renderers.

use std::fmt::Write;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use fmtree_core::Node;

use crate::error::FormatError;
use crate::render::{Render, relative_link, tabs};

/// Name of the per-directory landing page.
pub const README: &str = "README.md";

/// Bullet list of file names, one tab of indentation per level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkdownFormatter;

impl Render for MarkdownFormatter {
    fn render(&self, tree: &Node, out: &mut String) -> Result<(), FormatError> {
        for node in tree.walk() {
            writeln!(out, "{}- {}", tabs(node.depth), node.name)?;
        }
        Ok(())
    }
}

/// Bullet list where files link to their path relative to the tree root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkdownLinkFormatter;

impl Render for MarkdownLinkFormatter {
    fn render(&self, tree: &Node, out: &mut String) -> Result<(), FormatError> {
        for node in tree.walk() {
            let indent = tabs(node.depth);
            if node.is_file() {
                let link = relative_link(&tree.path, &node.path);
                writeln!(out, "{indent}- [{}]({link})", node.name)?;
            } else {
                writeln!(out, "{indent}- {}", node.name)?;
            }
        }
        Ok(())
    }
}

/// When directories get a link in GitHub output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DirLinkMode {
    /// Directories are plain bullets.
    None,
    /// Link a directory only if it contains a `README.md`.
    #[default]
    IfReadme,
    /// Link every directory.
    Always,
}

/// Options for [`GithubMarkdownFormatter`].
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(default)]
pub struct GithubOptions {
    /// Render `README.md` files in bold instead of as links.
    pub suppress_readme_link: bool,

    /// Which directories get a link.
    pub dir_link: DirLinkMode,

    /// Point directory links at `<dir>/README.md` when the directory has one.
    pub link_to_readme: bool,

    /// Drop a trailing `.md` from displayed file names (link targets keep it).
    pub strip_md_extension: bool,

    /// Omit the root bullet; its children become top-level bullets.
    pub skip_root: bool,
}

impl Default for GithubOptions {
    fn default() -> Self {
        Self {
            suppress_readme_link: true,
            dir_link: DirLinkMode::IfReadme,
            link_to_readme: true,
            strip_md_extension: true,
            skip_root: false,
        }
    }
}

impl GithubOptions {
    /// Create a new options builder.
    pub fn builder() -> GithubOptionsBuilder {
        GithubOptionsBuilder::default()
    }
}

/// README-aware Markdown table of contents for documentation repositories.
#[derive(Debug, Clone, Default)]
pub struct GithubMarkdownFormatter {
    options: GithubOptions,
}

impl GithubMarkdownFormatter {
    /// Create a formatter with the given options.
    pub fn new(options: GithubOptions) -> Self {
        Self { options }
    }

    /// The active options.
    pub fn options(&self) -> &GithubOptions {
        &self.options
    }

    fn display_name<'a>(&self, name: &'a str) -> &'a str {
        if self.options.strip_md_extension {
            name.strip_suffix(".md").unwrap_or(name)
        } else {
            name
        }
    }

    fn directory_line(&self, root: &Node, node: &Node) -> String {
        let readme = has_readme(node);
        let linked = match self.options.dir_link {
            DirLinkMode::None => false,
            DirLinkMode::IfReadme => readme,
            DirLinkMode::Always => true,
        };
        if !linked {
            return format!("- {}", node.name);
        }

        let target = if readme && self.options.link_to_readme {
            node.path.join(README)
        } else {
            node.path.clone()
        };
        format!("- [{}]({})", node.name, relative_link(&root.path, &target))
    }

    fn file_line(&self, root: &Node, node: &Node) -> String {
        let label = self.display_name(&node.name);
        if self.options.suppress_readme_link && node.name == README {
            format!("- **{label}**")
        } else {
            format!("- [{label}]({})", relative_link(&root.path, &node.path))
        }
    }
}

impl Render for GithubMarkdownFormatter {
    fn render(&self, tree: &Node, out: &mut String) -> Result<(), FormatError> {
        let offset = u32::from(self.options.skip_root);
        for node in tree.walk() {
            if node.depth == tree.depth && self.options.skip_root {
                continue;
            }
            let line = if node.is_dir() {
                self.directory_line(tree, node)
            } else if node.is_file() {
                self.file_line(tree, node)
            } else {
                return Err(FormatError::UnexpectedKind {
                    path: node.path.clone(),
                });
            };
            let depth = node.depth.saturating_sub(tree.depth).saturating_sub(offset);
            writeln!(out, "{}{line}", tabs(depth))?;
        }
        Ok(())
    }
}

/// Whether a directory node has a `README.md`, judged by its children first
/// and then by the filesystem.
fn has_readme(node: &Node) -> bool {
    node.children
        .iter()
        .any(|child| child.is_file() && child.name == README)
        || node.path.join(README).is_file()
}
