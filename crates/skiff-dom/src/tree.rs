//! DOM tree (arena-based allocation)
//!
//! Link maintenance is the atomic mutation primitive: a node appears in
//! its parent's child chain if and only if its parent link points back,
//! and both sides change in the same call. Event dispatch and index upkeep
//! layer above, in `Document`.

use crate::error::{DomError, DomResult};
use crate::node::{Node, NodeData};
use crate::NodeId;

/// Arena-backed document tree. Slot 0 is always the document node.
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    /// The document node.
    #[inline]
    pub fn document_node(&self) -> NodeId {
        NodeId::DOCUMENT
    }

    /// Allocate a detached node.
    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Indexed access for links the tree itself maintains. A dangling id
    /// here is a defect, not a caller error.
    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    /// Number of allocated nodes (attached or not).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent.get()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child.get()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).last_child.get()
    }

    /// Previous sibling, derived from the parent's child chain.
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling.get()
    }

    /// Next sibling, derived from the parent's child chain.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling.get()
    }

    /// Direct children, in document order.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.node(id).first_child,
        }
    }

    /// Ancestor chain, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.node(id).parent,
        }
    }

    /// Subtree of `root` in document order, excluding `root` itself.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            root,
            next: self.node(root).first_child,
        }
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.children(parent).nth(index)
    }

    /// Position of `child` within its parent's child sequence.
    pub fn index_of(&self, child: NodeId) -> Option<usize> {
        let parent = self.parent(child)?;
        self.children(parent).position(|c| c == child)
    }

    /// Whether `node` lies in the subtree rooted at `ancestor`
    /// (exclusive).
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Whether the node's ancestor chain reaches the document node. Only
    /// attached subtrees participate in the document id index.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == NodeId::DOCUMENT || self.ancestors(id).any(|a| a == NodeId::DOCUMENT)
    }

    /// Link `child` into `parent` at `index`. Both sides of the
    /// relationship update here, atomically from the caller's view.
    pub(crate) fn insert_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: usize,
    ) -> DomResult<()> {
        if self.get(parent).is_none() || self.get(child).is_none() {
            return Err(DomError::NotFound);
        }
        if !self.node(child).parent.is_none() {
            return Err(DomError::State("node is already attached to a parent"));
        }
        if child == parent || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest);
        }
        if matches!(self.node(parent).data, NodeData::Doctype { .. }) {
            return Err(DomError::HierarchyRequest);
        }

        let count = self.child_count(parent);
        if index > count {
            return Err(DomError::IndexSize);
        }
        let before = if index == count {
            NodeId::NONE
        } else {
            // count > 0, so the nth child exists
            self.child_at(parent, index).unwrap_or(NodeId::NONE)
        };
        self.link_before(parent, child, before);
        Ok(())
    }

    /// Unlink `child` from `parent`.
    pub(crate) fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        if self.get(parent).is_none() || self.get(child).is_none() {
            return Err(DomError::NotFound);
        }
        if self.node(child).parent != parent {
            return Err(DomError::NotFound);
        }
        self.unlink(child);
        Ok(())
    }

    fn link_before(&mut self, parent: NodeId, child: NodeId, before: NodeId) {
        let (prev, next) = if before.is_none() {
            (self.node(parent).last_child, NodeId::NONE)
        } else {
            (self.node(before).prev_sibling, before)
        };

        {
            let c = self.node_mut(child);
            c.parent = parent;
            c.prev_sibling = prev;
            c.next_sibling = next;
        }
        if prev.is_none() {
            self.node_mut(parent).first_child = child;
        } else {
            self.node_mut(prev).next_sibling = child;
        }
        if next.is_none() {
            self.node_mut(parent).last_child = child;
        } else {
            self.node_mut(next).prev_sibling = child;
        }
    }

    fn unlink(&mut self, child: NodeId) {
        let (parent, prev, next) = {
            let c = self.node(child);
            (c.parent, c.prev_sibling, c.next_sibling)
        };

        if prev.is_none() {
            self.node_mut(parent).first_child = next;
        } else {
            self.node_mut(prev).next_sibling = next;
        }
        if next.is_none() {
            self.node_mut(parent).last_child = prev;
        } else {
            self.node_mut(next).prev_sibling = prev;
        }

        let c = self.node_mut(child);
        c.parent = NodeId::NONE;
        c.prev_sibling = NodeId::NONE;
        c.next_sibling = NodeId::NONE;
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over direct children.
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.get()?;
        self.next = self.tree.node(current).next_sibling;
        Some(current)
    }
}

/// Iterator over the ancestor chain, nearest first.
pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.get()?;
        self.next = self.tree.node(current).parent;
        Some(current)
    }
}

/// Pre-order iterator over a subtree, excluding its root.
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.get()?;

        // Advance: first child, else next sibling, else climb toward the
        // root looking for an unvisited sibling.
        let node = self.tree.node(current);
        self.next = if !node.first_child.is_none() {
            node.first_child
        } else {
            let mut cursor = current;
            loop {
                if cursor == self.root {
                    break NodeId::NONE;
                }
                let n = self.tree.node(cursor);
                if !n.next_sibling.is_none() {
                    break n.next_sibling;
                }
                if n.parent.is_none() {
                    break NodeId::NONE;
                }
                cursor = n.parent;
            }
        };
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::qname::QualName;

    fn element(tree: &mut DomTree, tag: &str) -> NodeId {
        tree.alloc(Node::element(QualName::local(tag), Vec::new()))
    }

    #[test]
    fn test_insert_links_both_sides() {
        let mut tree = DomTree::new();
        let root = tree.document_node();
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        let c = element(&mut tree, "c");

        tree.insert_child(root, a, 0).unwrap();
        tree.insert_child(root, c, 1).unwrap();
        tree.insert_child(root, b, 1).unwrap();

        let children: Vec<_> = tree.children(root).collect();
        assert_eq!(children, vec![a, b, c]);
        assert_eq!(tree.parent(b), Some(root));
        assert_eq!(tree.prev_sibling(b), Some(a));
        assert_eq!(tree.next_sibling(b), Some(c));
        assert_eq!(tree.first_child(root), Some(a));
        assert_eq!(tree.last_child(root), Some(c));
        assert_eq!(tree.index_of(c), Some(2));
    }

    #[test]
    fn test_insert_attached_node_fails() {
        let mut tree = DomTree::new();
        let root = tree.document_node();
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        tree.insert_child(root, a, 0).unwrap();
        tree.insert_child(a, b, 0).unwrap();

        assert_eq!(
            tree.insert_child(root, b, 0),
            Err(DomError::State("node is already attached to a parent"))
        );
    }

    #[test]
    fn test_insert_into_own_subtree_fails() {
        let mut tree = DomTree::new();
        let root = tree.document_node();
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        tree.insert_child(root, a, 0).unwrap();
        tree.insert_child(a, b, 0).unwrap();

        let c = element(&mut tree, "c");
        tree.insert_child(b, c, 0).unwrap();
        tree.remove_child(root, a).unwrap();

        // a's subtree contains b; inserting a under b would cycle
        assert_eq!(tree.insert_child(b, a, 0), Err(DomError::HierarchyRequest));
    }

    #[test]
    fn test_insert_index_out_of_range() {
        let mut tree = DomTree::new();
        let root = tree.document_node();
        let a = element(&mut tree, "a");
        assert_eq!(tree.insert_child(root, a, 1), Err(DomError::IndexSize));
    }

    #[test]
    fn test_remove_wrong_parent_fails() {
        let mut tree = DomTree::new();
        let root = tree.document_node();
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        tree.insert_child(root, a, 0).unwrap();
        tree.insert_child(a, b, 0).unwrap();

        assert_eq!(tree.remove_child(root, b), Err(DomError::NotFound));

        tree.remove_child(a, b).unwrap();
        assert_eq!(tree.parent(b), None);
        // second removal fails: a no longer owns b
        assert_eq!(tree.remove_child(a, b), Err(DomError::NotFound));
    }

    #[test]
    fn test_remove_middle_child_relinks_siblings() {
        let mut tree = DomTree::new();
        let root = tree.document_node();
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        let c = element(&mut tree, "c");
        for (i, id) in [a, b, c].into_iter().enumerate() {
            tree.insert_child(root, id, i).unwrap();
        }

        tree.remove_child(root, b).unwrap();
        assert_eq!(tree.children(root).collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(tree.next_sibling(a), Some(c));
        assert_eq!(tree.prev_sibling(c), Some(a));
    }

    #[test]
    fn test_descendants_document_order() {
        let mut tree = DomTree::new();
        let root = tree.document_node();
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        let c = element(&mut tree, "c");
        let d = element(&mut tree, "d");
        tree.insert_child(root, a, 0).unwrap();
        tree.insert_child(a, b, 0).unwrap();
        tree.insert_child(b, c, 0).unwrap();
        tree.insert_child(a, d, 1).unwrap();

        let order: Vec<_> = tree.descendants(root).collect();
        assert_eq!(order, vec![a, b, c, d]);
        let order: Vec<_> = tree.descendants(a).collect();
        assert_eq!(order, vec![b, c, d]);
    }

    #[test]
    fn test_attachment() {
        let mut tree = DomTree::new();
        let root = tree.document_node();
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        tree.insert_child(a, b, 0).unwrap();

        assert!(!tree.is_attached(a));
        assert!(!tree.is_attached(b));

        tree.insert_child(root, a, 0).unwrap();
        assert!(tree.is_attached(a));
        assert!(tree.is_attached(b));
    }
}
