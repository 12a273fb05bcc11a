//! Live node lists
//!
//! A cache in front of a recomputation function. Construction installs one
//! structural and one attribute listener on the root whose sole effect is
//! clearing the cache; the next read recomputes. The bus holds the
//! listener weakly, so dropping the list is enough to end the
//! observation.

use std::cell::RefCell;
use std::rc::Rc;

use crate::document::Document;
use crate::events::{
    AttributeEvent, AttributeListener, CharDataEvent, StructureEvent, StructureListener,
};
use crate::NodeId;

/// Match predicate for a live list; supplied by the concrete collection.
pub trait NodeFilter {
    fn matches(&self, doc: &Document, root: NodeId, node: NodeId) -> bool;
}

/// All descendant elements of the root with a given tag name. Tag
/// comparison follows the document's case sensitivity.
#[derive(Debug, Clone)]
pub struct TagNameFilter {
    name: String,
}

impl TagNameFilter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl NodeFilter for TagNameFilter {
    fn matches(&self, doc: &Document, _root: NodeId, node: NodeId) -> bool {
        let Some(el) = doc.tree().get(node).and_then(|n| n.as_element()) else {
            return false;
        };
        let tag = el.name().qualified();
        if doc.config().case_insensitive {
            tag.eq_ignore_ascii_case(&self.name)
        } else {
            tag == self.name
        }
    }
}

/// Direct element children of the root with a given tag name.
#[derive(Debug, Clone)]
pub struct ChildTagFilter {
    inner: TagNameFilter,
}

impl ChildTagFilter {
    pub fn new(name: &str) -> Self {
        Self {
            inner: TagNameFilter::new(name),
        }
    }
}

impl NodeFilter for ChildTagFilter {
    fn matches(&self, doc: &Document, root: NodeId, node: NodeId) -> bool {
        doc.tree().parent(node) == Some(root) && self.inner.matches(doc, root, node)
    }
}

/// Shared invalidation cell. The bus holds it weakly; every notification
/// clears the cached sequence.
#[derive(Debug, Default)]
struct ListCache {
    entries: RefCell<Option<Vec<NodeId>>>,
}

impl ListCache {
    fn clear(&self) {
        self.entries.replace(None);
    }
}

impl StructureListener for ListCache {
    fn node_added(&self, _event: &StructureEvent) {
        self.clear();
    }
    fn node_removed(&self, _event: &StructureEvent) {
        self.clear();
    }
    fn character_data_changed(&self, _event: &CharDataEvent) {
        self.clear();
    }
}

impl AttributeListener for ListCache {
    fn attribute_added(&self, _event: &AttributeEvent) {
        self.clear();
    }
    fn attribute_removed(&self, _event: &AttributeEvent) {
        self.clear();
    }
    fn attribute_replaced(&self, _event: &AttributeEvent) {
        self.clear();
    }
}

/// Cached, auto-invalidating ordered view over nodes matching a predicate
/// under a root.
pub struct LiveNodeList<F> {
    root: Option<NodeId>,
    filter: F,
    cache: Rc<ListCache>,
}

impl<F: NodeFilter> LiveNodeList<F> {
    /// Bind to `root` and start observing it. A `None` root yields a
    /// permanently empty list: the empty sequence is pre-cached and no
    /// listener is installed.
    pub fn new(doc: &mut Document, root: Option<NodeId>, filter: F) -> Self {
        let cache = Rc::new(ListCache::default());
        match root {
            Some(root) => {
                let structure: Rc<dyn StructureListener> = cache.clone();
                let attribute: Rc<dyn AttributeListener> = cache.clone();
                doc.add_structure_listener(root, Rc::downgrade(&structure));
                doc.add_attribute_listener(root, Rc::downgrade(&attribute));
            }
            None => {
                cache.entries.replace(Some(Vec::new()));
            }
        }
        Self { root, filter, cache }
    }

    /// Matching nodes in document order. Serves the cache when valid,
    /// recomputes otherwise. Recomputation is idempotent: racing reads
    /// after an invalidation each compute the same sequence.
    pub fn nodes(&self, doc: &Document) -> Vec<NodeId> {
        if let Some(cached) = self.cache.entries.borrow().as_ref() {
            return cached.clone();
        }
        let computed = self.recompute(doc);
        self.cache.entries.replace(Some(computed.clone()));
        computed
    }

    pub fn len(&self, doc: &Document) -> usize {
        self.nodes(doc).len()
    }

    pub fn is_empty(&self, doc: &Document) -> bool {
        self.nodes(doc).is_empty()
    }

    pub fn item(&self, doc: &Document, index: usize) -> Option<NodeId> {
        self.nodes(doc).get(index).copied()
    }

    fn recompute(&self, doc: &Document) -> Vec<NodeId> {
        let Some(root) = self.root else {
            return Vec::new();
        };
        doc.tree()
            .descendants(root)
            .filter(|&node| self.filter.matches(doc, root, node))
            .collect()
    }

    /// Whether a cached sequence is currently held. Test hook.
    #[cfg(test)]
    fn has_cache(&self) -> bool {
        self.cache.entries.borrow().is_some()
    }
}
