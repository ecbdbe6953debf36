//! Identity history for cycle and hardlink avoidance.

use std::collections::HashSet;

use fmtree_core::Identity;

/// Tracks identities already reached during one scrape.
///
/// A directory reached through a symlink back to an ancestor, or a directory
/// hardlinked under two names, has an identity that is already present and
/// is not descended into again. The set is owned by a single run.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: HashSet<Identity>,
}

impl VisitedSet {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    /// Record an identity. Returns `true` if this is the first time seeing it.
    pub fn visit(&mut self, identity: Identity) -> bool {
        self.seen.insert(identity)
    }

    /// Forget everything; called at the start of every run.
    pub fn clear(&mut self) {
        self.seen.clear();
    }
}
