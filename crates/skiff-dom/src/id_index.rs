//! Document id index
//!
//! Explicit insert/remove/rename operations, called from the
//! attribute-mutation and subtree attach/detach paths. Keeping the index a
//! separate component keeps the side effects out of the value setters and
//! testable on their own.

use std::collections::HashMap;

use crate::NodeId;

/// Id-to-element lookup for a document.
///
/// Several elements may carry the same id; lookup returns the first one
/// registered still present.
#[derive(Debug, Default)]
pub struct IdIndex {
    by_id: HashMap<String, Vec<NodeId>>,
}

impl IdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &str, node: NodeId) {
        self.by_id.entry(id.to_string()).or_default().push(node);
    }

    pub fn remove(&mut self, id: &str, node: NodeId) {
        if let Some(nodes) = self.by_id.get_mut(id) {
            if let Some(pos) = nodes.iter().position(|&n| n == node) {
                nodes.remove(pos);
            }
            if nodes.is_empty() {
                self.by_id.remove(id);
            }
        }
    }

    /// Re-key a node: remove the old mapping, add the new one.
    pub fn rename(&mut self, old: &str, new: &str, node: NodeId) {
        self.remove(old, node);
        self.insert(new, node);
    }

    pub fn get(&self, id: &str) -> Option<NodeId> {
        self.by_id.get(id).and_then(|nodes| nodes.first().copied())
    }

    pub fn clear(&mut self) {
        self.by_id.clear();
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut index = IdIndex::new();
        index.insert("a", NodeId(1));
        assert_eq!(index.get("a"), Some(NodeId(1)));
        assert_eq!(index.get("b"), None);
    }

    #[test]
    fn test_duplicate_ids_first_wins() {
        let mut index = IdIndex::new();
        index.insert("a", NodeId(1));
        index.insert("a", NodeId(2));
        assert_eq!(index.get("a"), Some(NodeId(1)));

        index.remove("a", NodeId(1));
        assert_eq!(index.get("a"), Some(NodeId(2)));
    }

    #[test]
    fn test_rename_leaves_no_stale_entry() {
        let mut index = IdIndex::new();
        index.insert("old", NodeId(1));
        index.rename("old", "new", NodeId(1));

        assert_eq!(index.get("old"), None);
        assert_eq!(index.get("new"), Some(NodeId(1)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut index = IdIndex::new();
        index.remove("missing", NodeId(1));
        assert!(index.is_empty());
    }
}
