//! Nested HTML list renderer.

use std::fmt::Write;

use fmtree_core::Node;

use crate::error::FormatError;
use crate::render::Render;

/// Nested `<ul>`/`<li>` markup.
///
/// Every directory opens one `<ul>` for its children, every node is one
/// `<li>`, and tags close in traversal order. Names are HTML-escaped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HtmlFormatter;

impl HtmlFormatter {
    const INDENT: &'static str = "  ";

    fn render_node(node: &Node, level: usize, out: &mut String) -> Result<(), FormatError> {
        let pad = Self::INDENT.repeat(level);
        let name = escape(&node.name);
        if !node.is_dir() {
            writeln!(out, "{pad}<li>{name}</li>")?;
            return Ok(());
        }

        writeln!(out, "{pad}<li>{name}")?;
        writeln!(out, "{pad}{}<ul>", Self::INDENT)?;
        for child in &node.children {
            Self::render_node(child, level + 2, out)?;
        }
        writeln!(out, "{pad}{}</ul>", Self::INDENT)?;
        writeln!(out, "{pad}</li>")?;
        Ok(())
    }
}

impl Render for HtmlFormatter {
    fn render(&self, tree: &Node, out: &mut String) -> Result<(), FormatError> {
        writeln!(out, "<ul>")?;
        Self::render_node(tree, 1, out)?;
        writeln!(out, "</ul>")?;
        Ok(())
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{dir, file};

    #[test]
    fn test_nesting() {
        let tree = dir(&[]).with_children(vec![
            file(&["a.md"]),
            dir(&["d"]).with_children(vec![file(&["d", "b.md"])]),
        ]);
        let text = HtmlFormatter.generate(&tree).unwrap();
        let expected = "\
<ul>
  <li>root
    <ul>
      <li>a.md</li>
      <li>d
        <ul>
          <li>b.md</li>
        </ul>
      </li>
    </ul>
  </li>
</ul>
";
        assert_eq!(text, expected);
        assert_eq!(text.matches("<ul>").count(), text.matches("</ul>").count());
    }

    #[test]
    fn test_empty_directory_keeps_list() {
        let text = HtmlFormatter.generate(&dir(&[])).unwrap();
        assert_eq!(text, "<ul>\n  <li>root\n    <ul>\n    </ul>\n  </li>\n</ul>\n");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#39;");
    }
}
