//! Document - owning context for a markup tree
//!
//! Every mutation goes through here and follows the same sequence: link
//! or value update, id-index upkeep, generation bump, then synchronous
//! change notification. The arena, the bus, the id index and the config
//! live together so that sequence cannot be skipped.

use std::borrow::Cow;
use std::path::Path;
use std::rc::Weak;

use crate::attr::Attribute;
use crate::error::{DomError, DomResult, SerializeError};
use crate::events::{
    AttributeEvent, AttributeListener, CharDataEvent, MutationBus, StructureEvent,
    StructureListener,
};
use crate::generation::Generation;
use crate::id_index::IdIndex;
use crate::list::{LiveNodeList, TagNameFilter};
use crate::node::{Node, NodeData};
use crate::qname::QualName;
use crate::tree::DomTree;
use crate::{path, serialize, NodeId};

/// Ambient document configuration.
#[derive(Debug, Clone)]
pub struct DomConfig {
    /// Tag-name comparison ignores ASCII case, and local-name lookups fold
    /// during path-query evaluation.
    pub case_insensitive: bool,
    /// Attribute name feeding the document id index.
    pub id_attribute: String,
}

impl Default for DomConfig {
    fn default() -> Self {
        Self {
            case_insensitive: true,
            id_attribute: "id".to_string(),
        }
    }
}

/// A live markup document.
pub struct Document {
    tree: DomTree,
    bus: MutationBus,
    ids: IdIndex,
    config: DomConfig,
    generation: Generation,
}

impl Document {
    pub fn new() -> Self {
        Self::with_config(DomConfig::default())
    }

    pub fn with_config(config: DomConfig) -> Self {
        Self {
            tree: DomTree::new(),
            bus: MutationBus::new(),
            ids: IdIndex::new(),
            config,
            generation: Generation::INITIAL,
        }
    }

    #[inline]
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    #[inline]
    pub fn config(&self) -> &DomConfig {
        &self.config
    }

    /// The document node (root of the attached tree).
    #[inline]
    pub fn document_node(&self) -> NodeId {
        self.tree.document_node()
    }

    /// Current mutation generation.
    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    // ---- node creation ------------------------------------------------

    /// Create a detached element with no namespace.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.create_element_with_attrs(QualName::local(tag), Vec::new())
    }

    /// Create a detached element from a qualified name.
    pub fn create_element_ns(&mut self, name: QualName) -> NodeId {
        self.create_element_with_attrs(name, Vec::new())
    }

    /// Create a detached element carrying an initial attribute set, e.g.
    /// the raw table a parser or element factory hands over. On duplicate
    /// names the first occurrence wins.
    pub fn create_element_with_attrs(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        let mut deduped: Vec<Attribute> = Vec::with_capacity(attrs.len());
        for attr in attrs {
            if deduped
                .iter()
                .all(|a| a.name().qualified() != attr.name().qualified())
            {
                deduped.push(attr);
            }
        }
        self.tree.alloc(Node::element(name, deduped))
    }

    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.tree.alloc(Node::detached(NodeData::Text(data.to_string())))
    }

    pub fn create_cdata(&mut self, data: &str) -> NodeId {
        self.tree.alloc(Node::detached(NodeData::CData(data.to_string())))
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.tree.alloc(Node::detached(NodeData::Comment(data.to_string())))
    }

    pub fn create_processing_instruction(&mut self, target: &str, data: &str) -> NodeId {
        self.tree.alloc(Node::detached(NodeData::ProcessingInstruction {
            target: target.to_string(),
            data: data.to_string(),
        }))
    }

    /// Create a detached forest container.
    pub fn create_fragment(&mut self) -> NodeId {
        self.tree.alloc(Node::detached(NodeData::Fragment))
    }

    pub fn create_doctype(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> NodeId {
        self.tree.alloc(Node::detached(NodeData::Doctype {
            name: name.to_string(),
            public_id: public_id.map(str::to_string),
            system_id: system_id.map(str::to_string),
        }))
    }

    // ---- structural mutation ------------------------------------------

    /// Insert `child` into `parent`'s child sequence at `index`.
    ///
    /// Fails with [`DomError::State`] if `child` is attached elsewhere;
    /// callers detach first. On success exactly one structural "added"
    /// notification fires for `(parent, child)`.
    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, index: usize) -> DomResult<()> {
        self.tree.insert_child(parent, child, index)?;
        self.generation.bump();
        if self.tree.is_attached(parent) {
            self.register_subtree_ids(child);
        }
        self.bus
            .notify_node_added(&self.tree, &StructureEvent { parent, child });
        Ok(())
    }

    /// Insert `child` at the end of `parent`'s child sequence.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let index = self.tree.child_count(parent);
        self.insert_child(parent, child, index)
    }

    /// Remove `child` from `parent`.
    ///
    /// Fails with [`DomError::NotFound`] unless `parent` currently owns
    /// `child`. On success exactly one structural "removed" notification
    /// fires for `(parent, child)`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let parent_attached =
            self.tree.get(parent).is_some() && self.tree.is_attached(parent);
        self.tree.remove_child(parent, child)?;
        self.generation.bump();
        if parent_attached {
            self.deregister_subtree_ids(child);
        }
        self.bus
            .notify_node_removed(&self.tree, &StructureEvent { parent, child });
        Ok(())
    }

    /// Produce a detached copy of `node`.
    ///
    /// Variant data is copied (attributes keep their `specified` flags).
    /// With `deep`, children are cloned recursively and attached through
    /// the ordinary insertion path; the id index is untouched until the
    /// clone itself is attached under the document.
    pub fn clone_node(&mut self, node: NodeId, deep: bool) -> DomResult<NodeId> {
        let data = self.tree.get(node).ok_or(DomError::NotFound)?.data().clone();
        let clone = self.tree.alloc(Node::detached(data));
        if deep {
            let children: Vec<NodeId> = self.tree.children(node).collect();
            for child in children {
                let child_clone = self.clone_node(child, true)?;
                self.append_child(clone, child_clone)?;
            }
        }
        Ok(clone)
    }

    // ---- attributes ---------------------------------------------------

    /// Raw attribute value by qualified name.
    pub fn attribute(&self, element: NodeId, qualified: &str) -> Option<&str> {
        self.attribute_node(element, qualified).map(Attribute::value)
    }

    pub fn attribute_node(&self, element: NodeId, qualified: &str) -> Option<&Attribute> {
        self.tree.get(element)?.as_element()?.attr(qualified)
    }

    /// Raw attribute value by namespace URI and local name.
    pub fn attribute_ns(
        &self,
        element: NodeId,
        namespace: Option<&str>,
        local: &str,
    ) -> Option<&str> {
        self.tree
            .get(element)?
            .as_element()?
            .attr_ns(namespace, local)
            .map(Attribute::value)
    }

    /// Set an un-namespaced attribute.
    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.set_attribute_ns(element, QualName::local(name), value)
    }

    /// Set or replace an attribute.
    ///
    /// Setting the document's id attribute re-keys the element in the id
    /// index (remove old mapping, mutate, re-add) so lookups never go
    /// stale. One attribute notification fires: "replaced" carries the
    /// value before the change, "added" the value just set.
    pub fn set_attribute_ns(
        &mut self,
        element: NodeId,
        name: QualName,
        value: &str,
    ) -> DomResult<()> {
        let attached = self.tree.get(element).is_some() && self.tree.is_attached(element);
        let id_attr = self.config.id_attribute.clone();
        let el = self
            .tree
            .get_mut(element)
            .ok_or(DomError::NotFound)?
            .as_element_mut()
            .ok_or(DomError::State("node is not an element"))?;
        let qualified = name.qualified().to_string();

        match el.attr_index(&qualified) {
            Some(i) => {
                let old = el.attrs[i].value().to_string();
                el.attrs[i].set_value(value);
                if attached && qualified == id_attr {
                    self.ids.rename(&old, value, element);
                }
                self.generation.bump();
                self.bus.notify_attribute_replaced(
                    &self.tree,
                    &AttributeEvent {
                        element,
                        name: qualified,
                        value: old,
                    },
                );
            }
            None => {
                el.attrs.push(Attribute::new(name, value));
                if attached && qualified == id_attr {
                    self.ids.insert(value, element);
                }
                self.generation.bump();
                self.bus.notify_attribute_added(
                    &self.tree,
                    &AttributeEvent {
                        element,
                        name: qualified,
                        value: value.to_string(),
                    },
                );
            }
        }
        Ok(())
    }

    /// Remove an attribute. Removing an absent attribute is a no-op and
    /// fires nothing.
    pub fn remove_attribute(&mut self, element: NodeId, qualified: &str) -> DomResult<()> {
        let attached = self.tree.get(element).is_some() && self.tree.is_attached(element);
        let id_attr = self.config.id_attribute.clone();
        let el = self
            .tree
            .get_mut(element)
            .ok_or(DomError::NotFound)?
            .as_element_mut()
            .ok_or(DomError::State("node is not an element"))?;
        let Some(i) = el.attr_index(qualified) else {
            return Ok(());
        };
        let old = el.attrs.remove(i);
        if attached && qualified == id_attr {
            self.ids.remove(old.value(), element);
        }
        self.generation.bump();
        self.bus.notify_attribute_removed(
            &self.tree,
            &AttributeEvent {
                element,
                name: qualified.to_string(),
                value: old.value().to_string(),
            },
        );
        Ok(())
    }

    /// Re-key an attribute. The id index follows when the old or new name
    /// is the document's id attribute; listeners see a removal of the old
    /// name then an addition of the new one.
    pub fn rename_attribute(
        &mut self,
        element: NodeId,
        old_name: &str,
        new_name: &str,
    ) -> DomResult<()> {
        let attached = self.tree.get(element).is_some() && self.tree.is_attached(element);
        let id_attr = self.config.id_attribute.clone();
        let el = self
            .tree
            .get_mut(element)
            .ok_or(DomError::NotFound)?
            .as_element_mut()
            .ok_or(DomError::State("node is not an element"))?;
        let i = el.attr_index(old_name).ok_or(DomError::NotFound)?;
        if el.attr_index(new_name).is_some() {
            return Err(DomError::State("attribute name already present"));
        }
        let value = el.attrs[i].value().to_string();
        let namespace = el.attrs[i].name().namespace_uri().map(str::to_string);
        el.attrs[i].set_name(QualName::new(new_name, namespace.as_deref()));

        if attached {
            if old_name == id_attr {
                self.ids.remove(&value, element);
            }
            if new_name == id_attr {
                self.ids.insert(&value, element);
            }
        }
        self.generation.bump();
        self.bus.notify_attribute_removed(
            &self.tree,
            &AttributeEvent {
                element,
                name: old_name.to_string(),
                value: value.clone(),
            },
        );
        self.bus.notify_attribute_added(
            &self.tree,
            &AttributeEvent {
                element,
                name: new_name.to_string(),
                value,
            },
        );
        Ok(())
    }

    // ---- character data -----------------------------------------------

    pub fn character_data(&self, node: NodeId) -> Option<&str> {
        self.tree.get(node)?.character_data()
    }

    /// Replace the character data of a text, CDATA, comment or
    /// processing-instruction node.
    pub fn set_character_data(&mut self, node: NodeId, data: &str) -> DomResult<()> {
        let n = self.tree.get_mut(node).ok_or(DomError::NotFound)?;
        let slot = match &mut n.data {
            NodeData::Text(s) | NodeData::CData(s) | NodeData::Comment(s) => s,
            NodeData::ProcessingInstruction { data: s, .. } => s,
            _ => return Err(DomError::State("node has no character data")),
        };
        let old_value = std::mem::replace(slot, data.to_string());
        self.generation.bump();
        self.bus
            .notify_character_data_changed(&self.tree, &CharDataEvent { node, old_value });
        Ok(())
    }

    // ---- queries ------------------------------------------------------

    /// First element registered under `id` in the id index.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id)
    }

    /// Live list of descendant elements of `root` with the given tag
    /// name.
    pub fn elements_by_tag_name(
        &mut self,
        root: Option<NodeId>,
        tag: &str,
    ) -> LiveNodeList<TagNameFilter> {
        LiveNodeList::new(self, root, TagNameFilter::new(tag))
    }

    /// Local name as a path-query evaluation sees it: folded to lower
    /// case only for a case-insensitive document, and only while a path
    /// query is being evaluated. `in_path_query` is the explicit context
    /// flag - there is no ambient state to set up or tear down.
    pub fn lookup_local_name<'a>(&self, name: &'a QualName, in_path_query: bool) -> Cow<'a, str> {
        name.lookup_local_name(self.config.case_insensitive && in_path_query)
    }

    // ---- observation --------------------------------------------------

    pub fn add_structure_listener(&mut self, node: NodeId, listener: Weak<dyn StructureListener>) {
        self.bus.add_structure_listener(node, listener);
    }

    pub fn add_attribute_listener(&mut self, node: NodeId, listener: Weak<dyn AttributeListener>) {
        self.bus.add_attribute_listener(node, listener);
    }

    // ---- addressing and serialization ---------------------------------

    /// Canonical positional path of `node`. Recomputed fresh on every
    /// call; never cached.
    pub fn canonical_xpath(&self, node: NodeId) -> DomResult<String> {
        path::canonical_xpath(self, node)
    }

    /// Canonical path of an attribute: owner path + `/@` + name.
    pub fn attribute_xpath(&self, element: NodeId, qualified: &str) -> DomResult<String> {
        path::attribute_xpath(self, element, qualified)
    }

    /// Serialize `node` to its XML text form.
    pub fn as_xml(&self, node: NodeId) -> Result<String, SerializeError> {
        serialize::as_xml(self, node)
    }

    /// Serialize `node` and write the whole buffer to `path` in one
    /// filesystem call; on failure the destination is absent or whole.
    pub fn save_xml(&self, node: NodeId, path: impl AsRef<Path>) -> Result<(), SerializeError> {
        serialize::save_xml(self, node, path)
    }

    // ---- maintenance --------------------------------------------------

    /// Merge adjacent text-node children of `node` and drop empty ones,
    /// through the ordinary mutation path (events fire).
    pub fn normalize(&mut self, node: NodeId) -> DomResult<()> {
        if self.tree.get(node).is_none() {
            return Err(DomError::NotFound);
        }
        let mut current = self.tree.first_child(node);
        while let Some(id) = current {
            let next = self.tree.next_sibling(id);
            if !matches!(self.tree.node(id).data(), NodeData::Text(_)) {
                current = next;
                continue;
            }

            let mut merged = self.tree.node(id).character_data().unwrap_or("").to_string();
            let mut run_next = next;
            let mut absorbed = false;
            while let Some(sibling) = run_next {
                if !matches!(self.tree.node(sibling).data(), NodeData::Text(_)) {
                    break;
                }
                merged.push_str(self.tree.node(sibling).character_data().unwrap_or(""));
                run_next = self.tree.next_sibling(sibling);
                self.remove_child(node, sibling)?;
                absorbed = true;
            }
            if absorbed {
                self.set_character_data(id, &merged)?;
            }
            if merged.is_empty() {
                self.remove_child(node, id)?;
            }
            current = run_next;
        }
        Ok(())
    }

    /// Tear down page-scoped state: detach every child of the document
    /// node through the ordinary removal path, then drop all listener
    /// registries and the id index.
    pub fn cleanup(&mut self) {
        let root = self.document_node();
        while let Some(child) = self.tree.first_child(root) {
            self.remove_child(root, child)
                .expect("document child removal cannot fail");
        }
        self.bus.clear();
        self.ids.clear();
        tracing::debug!(slots = self.tree.len(), "document torn down");
    }

    // ---- id index upkeep ----------------------------------------------

    fn register_subtree_ids(&mut self, root: NodeId) {
        for (value, node) in self.collect_subtree_ids(root) {
            self.ids.insert(&value, node);
        }
    }

    fn deregister_subtree_ids(&mut self, root: NodeId) {
        for (value, node) in self.collect_subtree_ids(root) {
            self.ids.remove(&value, node);
        }
    }

    fn collect_subtree_ids(&self, root: NodeId) -> Vec<(String, NodeId)> {
        let id_attr = &self.config.id_attribute;
        let mut found = Vec::new();
        let mut visit = |id: NodeId| {
            if let Some(attr) = self.tree.node(id).as_element().and_then(|el| el.attr(id_attr)) {
                found.push((attr.value().to_string(), id));
            }
        };
        visit(root);
        for id in self.tree.descendants(root) {
            visit(id);
        }
        found
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
