//! The rendering capability shared by every formatter.

use std::path::Path;

use itertools::Itertools;

use fmtree_core::Node;

use crate::error::FormatError;

/// Turns a finished tree into text.
///
/// Renderers walk the tree depth-first, parent before children, and never
/// modify it.
pub trait Render {
    /// Append the rendering of `tree` to `out`.
    fn render(&self, tree: &Node, out: &mut String) -> Result<(), FormatError>;

    /// Render `tree` into a fresh buffer.
    fn generate(&self, tree: &Node) -> Result<String, FormatError> {
        let mut out = String::new();
        self.render(tree, &mut out)?;
        Ok(out)
    }
}

/// Markdown link target for `path` relative to the rendered root: `./a/b.md`.
///
/// The root itself is `./.`. Components are always joined with `/`.
pub(crate) fn relative_link(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    if relative.as_os_str().is_empty() {
        return "./.".to_string();
    }
    format!(
        "./{}",
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .join("/")
    )
}

/// Leading tab characters for a node at `depth`.
pub(crate) fn tabs(depth: u32) -> String {
    "\t".repeat(depth as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_link() {
        let root = Path::new("/docs");
        assert_eq!(relative_link(root, Path::new("/docs/a/b.md")), "./a/b.md");
        assert_eq!(relative_link(root, Path::new("/docs")), "./.");
    }

    #[test]
    fn test_tabs() {
        assert_eq!(tabs(0), "");
        assert_eq!(tabs(2), "\t\t");
    }
}
