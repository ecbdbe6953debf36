//! Tree-wide sibling reordering.
//!
//! A [`Sorter`] deep-copies a tree and rewrites the children of every node,
//! root to leaf, with a [`SiblingOrder`]. The input tree is left untouched so
//! the scraped and the sorted view can be compared side by side.

use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::node::Node;

/// Strict dotted-integer filename: one or more `digits.` groups and a
/// trailing digit group.
static DOTTED_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9]+\.)+[0-9]+$").expect("dotted-integer pattern is valid"));

/// Errors raised while reordering a tree.
#[derive(Debug, Error)]
pub enum SortError {
    /// The dotted-integer order came out decreasing on its leading component.
    #[error("sibling order under {parent} is not ascending: {previous:?} before {next:?}")]
    OrderViolation {
        parent: PathBuf,
        previous: String,
        next: String,
    },
}

/// Reorders the children of one directory.
///
/// `parent` gives structural context (its name, depth, path); orders must not
/// look at other levels of the tree.
pub trait SiblingOrder {
    /// Return the reordered children of `parent`.
    fn order(&self, parent: &Node, children: Vec<Node>) -> Result<Vec<Node>, SortError>;
}

/// Lexicographic order by filename.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByName;

impl SiblingOrder for ByName {
    fn order(&self, _parent: &Node, mut children: Vec<Node>) -> Result<Vec<Node>, SortError> {
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }
}

/// Numeric order for dotted-integer filenames (`1.2` < `1.10` < `2.1`).
///
/// Only applies below directories named `parent_name` (the scrape root never
/// qualifies). There, siblings that are not strict dotted integers are
/// dropped before sorting. Everywhere else children fall back to [`ByName`].
#[derive(Debug, Clone)]
pub struct DottedNumeric {
    parent_name: String,
}

impl DottedNumeric {
    /// Enable dotted-integer ordering below directories named `parent_name`.
    pub fn new(parent_name: impl Into<String>) -> Self {
        Self {
            parent_name: parent_name.into(),
        }
    }

    /// Name of the directory that triggers dotted-integer mode.
    pub fn parent_name(&self) -> &str {
        &self.parent_name
    }

    /// Whether `name` is a strict dotted integer such as `3.14` or `1.2.10`.
    pub fn is_dotted_integer(name: &str) -> bool {
        DOTTED_INTEGER.is_match(name)
    }

    fn applies_to(&self, parent: &Node) -> bool {
        parent
            .relative_path
            .as_deref()
            .and_then(|rel| rel.file_name())
            .is_some_and(|name| name.to_string_lossy() == self.parent_name)
    }
}

impl SiblingOrder for DottedNumeric {
    fn order(&self, parent: &Node, children: Vec<Node>) -> Result<Vec<Node>, SortError> {
        if !self.applies_to(parent) {
            return ByName.order(parent, children);
        }

        let before = children.len();
        let candidates: Vec<Node> = children
            .into_iter()
            .filter(|node| Self::is_dotted_integer(&node.name))
            .collect();
        tracing::debug!(
            parent = %parent.path.display(),
            kept = candidates.len(),
            dropped = before - candidates.len(),
            "dotted-integer ordering"
        );

        let sorted = merge_sort_by(candidates, &|a: &Node, b: &Node| {
            compare_dotted(&a.name, &b.name)
        });

        for pair in sorted.windows(2) {
            if compare_numeric(leading(&pair[0].name), leading(&pair[1].name)) == Ordering::Greater {
                return Err(SortError::OrderViolation {
                    parent: parent.path.clone(),
                    previous: pair[0].name.to_string(),
                    next: pair[1].name.to_string(),
                });
            }
        }

        Ok(sorted)
    }
}

/// The sibling orders shipped with fmtree.
#[derive(Debug, Clone, Default)]
pub enum SortStrategy {
    /// Lexicographic by filename.
    #[default]
    Name,
    /// Dotted-integer order below a named directory.
    DottedNumeric(DottedNumeric),
}

impl SiblingOrder for SortStrategy {
    fn order(&self, parent: &Node, children: Vec<Node>) -> Result<Vec<Node>, SortError> {
        match self {
            SortStrategy::Name => ByName.order(parent, children),
            SortStrategy::DottedNumeric(order) => order.order(parent, children),
        }
    }
}

/// Produces reordered deep copies of trees.
#[derive(Debug, Clone, Default)]
pub struct Sorter<O = SortStrategy> {
    order: O,
}

impl<O: SiblingOrder> Sorter<O> {
    /// Create a sorter around a sibling order.
    pub fn new(order: O) -> Self {
        Self { order }
    }

    /// Return a sorted copy of `tree`; `tree` itself is not modified.
    pub fn sort(&self, tree: &Node) -> Result<Node, SortError> {
        let mut copy = tree.clone();
        self.reorder(&mut copy)?;
        Ok(copy)
    }

    fn reorder(&self, node: &mut Node) -> Result<(), SortError> {
        if !node.children.is_empty() {
            let children = std::mem::take(&mut node.children);
            let ordered = self.order.order(node, children)?;
            node.children = ordered;
        }
        for child in &mut node.children {
            self.reorder(child)?;
        }
        Ok(())
    }
}

/// Compare two dotted-integer names component by component.
///
/// Comparison stops when either side runs out of components, so a shorter
/// name compares equal to any name it is a prefix of.
pub fn compare_dotted(a: &str, b: &str) -> Ordering {
    a.split('.')
        .zip(b.split('.'))
        .map(|(x, y)| compare_numeric(x, y))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Compare ASCII digit strings by value without overflow.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn leading(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

/// Stable merge sort.
///
/// `compare_dotted` is not a total order (prefix equality is not
/// transitive), which the standard library sorts may reject.
fn merge_sort_by<T>(mut items: Vec<T>, cmp: &impl Fn(&T, &T) -> Ordering) -> Vec<T> {
    if items.len() <= 1 {
        return items;
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort_by(items, cmp);
    let right = merge_sort_by(right, cmp);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => cmp(r, l) == Ordering::Less,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        merged.extend(if take_right { right.next() } else { left.next() });
    }
    merged
}
