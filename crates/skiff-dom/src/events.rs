//! Change notification
//!
//! Per-node listener registries, allocated only once a listener registers.
//! Dispatch is synchronous and walks the ancestor chain up from the
//! mutation point, so a listener on a subtree root hears every mutation at
//! or below it. The bus holds listeners weakly: a dead handle is a silent
//! no-op and is pruned on the next dispatch through its node.

use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::tree::DomTree;
use crate::NodeId;

/// Structural change: `child` added to or removed from `parent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureEvent {
    pub parent: NodeId,
    pub child: NodeId,
}

/// Attribute change on `element`.
///
/// For "replaced" and "removed" the carried value is the one *before* the
/// change; a listener needing the new value reads the attribute after
/// dispatch. For "added" it is the value just set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeEvent {
    pub element: NodeId,
    pub name: String,
    pub value: String,
}

/// Character data change on `node`; carries the value before the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharDataEvent {
    pub node: NodeId,
    pub old_value: String,
}

/// Observer of structural mutations.
pub trait StructureListener {
    fn node_added(&self, event: &StructureEvent);
    fn node_removed(&self, event: &StructureEvent);

    /// Character data mutated below the observed node. Ignored by
    /// default.
    fn character_data_changed(&self, _event: &CharDataEvent) {}
}

/// Observer of attribute mutations.
pub trait AttributeListener {
    fn attribute_added(&self, event: &AttributeEvent);
    fn attribute_removed(&self, event: &AttributeEvent);
    fn attribute_replaced(&self, event: &AttributeEvent);
}

enum AttributeKind {
    Added,
    Removed,
    Replaced,
}

/// Per-node registries of structural and attribute listeners.
///
/// Registration is not idempotent: registering the same listener twice
/// yields two notifications per event.
#[derive(Default)]
pub struct MutationBus {
    structure: HashMap<NodeId, Vec<Weak<dyn StructureListener>>>,
    attribute: HashMap<NodeId, Vec<Weak<dyn AttributeListener>>>,
}

impl MutationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_structure_listener(&mut self, node: NodeId, listener: Weak<dyn StructureListener>) {
        self.structure.entry(node).or_default().push(listener);
    }

    pub fn add_attribute_listener(&mut self, node: NodeId, listener: Weak<dyn AttributeListener>) {
        self.attribute.entry(node).or_default().push(listener);
    }

    pub(crate) fn notify_node_added(&mut self, tree: &DomTree, event: &StructureEvent) {
        self.dispatch_structure(tree, event.parent, |l| l.node_added(event));
    }

    pub(crate) fn notify_node_removed(&mut self, tree: &DomTree, event: &StructureEvent) {
        self.dispatch_structure(tree, event.parent, |l| l.node_removed(event));
    }

    pub(crate) fn notify_character_data_changed(&mut self, tree: &DomTree, event: &CharDataEvent) {
        let mut cursor = Some(event.node);
        while let Some(node) = cursor {
            for listener in self.live_structure_listeners(node) {
                listener.character_data_changed(event);
            }
            cursor = tree.parent(node);
        }
    }

    pub(crate) fn notify_attribute_added(&mut self, tree: &DomTree, event: &AttributeEvent) {
        self.dispatch_attribute(tree, event, AttributeKind::Added);
    }

    pub(crate) fn notify_attribute_removed(&mut self, tree: &DomTree, event: &AttributeEvent) {
        self.dispatch_attribute(tree, event, AttributeKind::Removed);
    }

    pub(crate) fn notify_attribute_replaced(&mut self, tree: &DomTree, event: &AttributeEvent) {
        self.dispatch_attribute(tree, event, AttributeKind::Replaced);
    }

    /// Drop every registry. Used by document teardown.
    pub(crate) fn clear(&mut self) {
        self.structure.clear();
        self.attribute.clear();
    }

    fn dispatch_structure<F>(&mut self, tree: &DomTree, start: NodeId, fire: F)
    where
        F: Fn(&dyn StructureListener),
    {
        let mut cursor = Some(start);
        while let Some(node) = cursor {
            for listener in self.live_structure_listeners(node) {
                fire(&*listener);
            }
            cursor = tree.parent(node);
        }
    }

    fn dispatch_attribute(&mut self, tree: &DomTree, event: &AttributeEvent, kind: AttributeKind) {
        let mut cursor = Some(event.element);
        while let Some(node) = cursor {
            for listener in self.live_attribute_listeners(node) {
                match kind {
                    AttributeKind::Added => listener.attribute_added(event),
                    AttributeKind::Removed => listener.attribute_removed(event),
                    AttributeKind::Replaced => listener.attribute_replaced(event),
                }
            }
            cursor = tree.parent(node);
        }
    }

    /// Upgrade the registry for `node`, pruning dead handles. Listeners
    /// are returned in registration order, duplicates included.
    fn live_structure_listeners(&mut self, node: NodeId) -> Vec<Rc<dyn StructureListener>> {
        let Some(entries) = self.structure.get_mut(&node) else {
            return Vec::new();
        };
        let live: Vec<_> = entries.iter().filter_map(Weak::upgrade).collect();
        entries.retain(|w| w.strong_count() > 0);
        if entries.is_empty() {
            self.structure.remove(&node);
        }
        live
    }

    fn live_attribute_listeners(&mut self, node: NodeId) -> Vec<Rc<dyn AttributeListener>> {
        let Some(entries) = self.attribute.get_mut(&node) else {
            return Vec::new();
        };
        let live: Vec<_> = entries.iter().filter_map(Weak::upgrade).collect();
        entries.retain(|w| w.strong_count() > 0);
        if entries.is_empty() {
            self.attribute.remove(&node);
        }
        live
    }

    /// Number of registered structural listeners on `node`, dead handles
    /// included. Test hook.
    #[cfg(test)]
    fn structure_registry_len(&self, node: NodeId) -> usize {
        self.structure.get(&node).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::qname::QualName;
    use std::cell::RefCell;

    /// Records every notification it sees.
    #[derive(Default)]
    struct Recorder {
        log: RefCell<Vec<String>>,
    }

    impl StructureListener for Recorder {
        fn node_added(&self, event: &StructureEvent) {
            self.log
                .borrow_mut()
                .push(format!("added {}->{}", event.parent.0, event.child.0));
        }
        fn node_removed(&self, event: &StructureEvent) {
            self.log
                .borrow_mut()
                .push(format!("removed {}->{}", event.parent.0, event.child.0));
        }
    }

    impl AttributeListener for Recorder {
        fn attribute_added(&self, event: &AttributeEvent) {
            self.log.borrow_mut().push(format!("attr+ {}", event.name));
        }
        fn attribute_removed(&self, event: &AttributeEvent) {
            self.log.borrow_mut().push(format!("attr- {}", event.name));
        }
        fn attribute_replaced(&self, event: &AttributeEvent) {
            self.log
                .borrow_mut()
                .push(format!("attr= {} was {}", event.name, event.value));
        }
    }

    fn tree_with_chain() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let root = tree.document_node();
        let mid = tree.alloc(Node::element(QualName::local("mid"), Vec::new()));
        let leaf = tree.alloc(Node::element(QualName::local("leaf"), Vec::new()));
        tree.insert_child(root, mid, 0).unwrap();
        tree.insert_child(mid, leaf, 0).unwrap();
        (tree, root, mid, leaf)
    }

    #[test]
    fn test_ancestor_chain_dispatch() {
        let (tree, root, mid, leaf) = tree_with_chain();
        let mut bus = MutationBus::new();
        let recorder = Rc::new(Recorder::default());
        let l: Rc<dyn StructureListener> = recorder.clone();
        bus.add_structure_listener(root, Rc::downgrade(&l));

        // mutation two levels below the listener's node
        bus.notify_node_added(
            &tree,
            &StructureEvent {
                parent: leaf,
                child: mid, // ids only; payload is not interpreted
            },
        );
        assert_eq!(recorder.log.borrow().len(), 1);
    }

    #[test]
    fn test_duplicate_registration_notifies_twice() {
        let (tree, root, mid, _leaf) = tree_with_chain();
        let mut bus = MutationBus::new();
        let recorder = Rc::new(Recorder::default());
        let l: Rc<dyn StructureListener> = recorder.clone();
        bus.add_structure_listener(root, Rc::downgrade(&l));
        bus.add_structure_listener(root, Rc::downgrade(&l));

        bus.notify_node_removed(&tree, &StructureEvent { parent: root, child: mid });
        assert_eq!(recorder.log.borrow().len(), 2);
    }

    #[test]
    fn test_dead_listener_is_pruned() {
        let (tree, root, mid, _leaf) = tree_with_chain();
        let mut bus = MutationBus::new();
        let recorder: Rc<dyn StructureListener> = Rc::new(Recorder::default());
        bus.add_structure_listener(root, Rc::downgrade(&recorder));
        assert_eq!(bus.structure_registry_len(root), 1);

        drop(recorder);
        // silent no-op, then the registry entry goes away
        bus.notify_node_added(&tree, &StructureEvent { parent: root, child: mid });
        assert_eq!(bus.structure_registry_len(root), 0);
    }

    #[test]
    fn test_attribute_dispatch_carries_old_value() {
        let (tree, _root, mid, _leaf) = tree_with_chain();
        let mut bus = MutationBus::new();
        let recorder = Rc::new(Recorder::default());
        let l: Rc<dyn AttributeListener> = recorder.clone();
        bus.add_attribute_listener(mid, Rc::downgrade(&l));

        bus.notify_attribute_replaced(
            &tree,
            &AttributeEvent {
                element: mid,
                name: "class".into(),
                value: "old".into(),
            },
        );
        assert_eq!(recorder.log.borrow()[0], "attr= class was old");
    }

    #[test]
    fn test_registries_allocated_lazily() {
        let bus = MutationBus::new();
        assert!(bus.structure.is_empty());
        assert!(bus.attribute.is_empty());
    }
}
