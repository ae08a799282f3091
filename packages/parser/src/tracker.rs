use crate::ast::NodeId;
use std::collections::HashSet;

/// Set of nodes whose own shape changed since parsing
///
/// Only the mutated node is recorded. Ancestors are derived at generation
/// time by [`ChangeTracker::affected`], so an edit costs the same no
/// matter how large the tree is.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    dirty: HashSet<NodeId>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a node as dirty; returns `false` if it already was
    pub fn mark(&mut self, id: NodeId) -> bool {
        self.dirty.insert(id)
    }

    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.dirty.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.dirty.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirty.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.dirty.iter().copied()
    }

    /// Dirty nodes plus every ancestor reached through `parent`
    pub fn affected(&self, parent: impl Fn(NodeId) -> Option<NodeId>) -> HashSet<NodeId> {
        let mut affected = HashSet::with_capacity(self.dirty.len() * 4);
        for id in &self.dirty {
            let mut current = Some(*id);
            while let Some(node) = current {
                if !affected.insert(node) {
                    // Path above was already walked
                    break;
                }
                current = parent(node);
            }
        }
        affected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_is_idempotent() {
        let mut tracker = ChangeTracker::new();

        assert!(tracker.mark(NodeId(3)));
        assert!(!tracker.mark(NodeId(3)));
        assert_eq!(tracker.len(), 1);
        assert!(tracker.is_dirty(NodeId(3)));
        assert!(!tracker.is_dirty(NodeId(2)));
    }

    #[test]
    fn test_affected_walks_to_root() {
        // 0 <- 1 <- 2, and 0 <- 3
        let parents = [None, Some(NodeId(0)), Some(NodeId(1)), Some(NodeId(0))];
        let mut tracker = ChangeTracker::new();
        tracker.mark(NodeId(2));

        let affected = tracker.affected(|id| parents[id.index()]);
        assert!(affected.contains(&NodeId(0)));
        assert!(affected.contains(&NodeId(1)));
        assert!(affected.contains(&NodeId(2)));
        assert!(!affected.contains(&NodeId(3)));
    }
}
