//! DOM node
//!
//! One arena slot: five sibling/child links plus a closed variant set for
//! the payload. Behavior differences between variants (node name,
//! serialized form) are a dispatch over the payload tag, not overrides.

use crate::attr::Attribute;
use crate::qname::QualName;
use crate::NodeId;

/// Node type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Element,
    Attribute,
    Text,
    CDataSection,
    ProcessingInstruction,
    Comment,
    Document,
    DocumentType,
    DocumentFragment,
}

/// DOM node - core structure.
#[derive(Debug)]
pub struct Node {
    /// Parent node (NONE if detached or root)
    pub(crate) parent: NodeId,
    /// First child
    pub(crate) first_child: NodeId,
    /// Last child (for O(1) append)
    pub(crate) last_child: NodeId,
    /// Previous sibling
    pub(crate) prev_sibling: NodeId,
    /// Next sibling
    pub(crate) next_sibling: NodeId,
    /// Node-specific data
    pub(crate) data: NodeData,
}

impl Node {
    /// Create a detached node around variant data.
    pub(crate) fn detached(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create the document node.
    pub(crate) fn document() -> Self {
        Self::detached(NodeData::Document)
    }

    /// Create an element node.
    pub(crate) fn element(name: QualName, attrs: Vec<Attribute>) -> Self {
        Self::detached(NodeData::Element(ElementData { name, attrs }))
    }

    /// Node-specific data.
    #[inline]
    pub fn data(&self) -> &NodeData {
        &self.data
    }

    /// Node type tag.
    pub fn node_type(&self) -> NodeType {
        match &self.data {
            NodeData::Document => NodeType::Document,
            NodeData::Doctype { .. } => NodeType::DocumentType,
            NodeData::Element(_) => NodeType::Element,
            NodeData::Text(_) => NodeType::Text,
            NodeData::CData(_) => NodeType::CDataSection,
            NodeData::Comment(_) => NodeType::Comment,
            NodeData::ProcessingInstruction { .. } => NodeType::ProcessingInstruction,
            NodeData::Fragment => NodeType::DocumentFragment,
        }
    }

    /// Node name. Tag name for elements, fixed symbolic string for the
    /// character-data and container variants, target for processing
    /// instructions.
    pub fn node_name(&self) -> &str {
        match &self.data {
            NodeData::Document => "#document",
            NodeData::Doctype { name, .. } => name,
            NodeData::Element(e) => e.name.qualified(),
            NodeData::Text(_) => "#text",
            NodeData::CData(_) => "#cdata-section",
            NodeData::Comment(_) => "#comment",
            NodeData::ProcessingInstruction { target, .. } => target,
            NodeData::Fragment => "#document-fragment",
        }
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Character data for text, CDATA, comment and processing-instruction
    /// nodes.
    pub fn character_data(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(s) | NodeData::CData(s) | NodeData::Comment(s) => Some(s),
            NodeData::ProcessingInstruction { data, .. } => Some(data),
            _ => None,
        }
    }
}

/// Node-specific data.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root
    Document,
    /// DOCTYPE declaration: immutable name/public/system triple, no
    /// children, no entities or notations.
    Doctype {
        name: String,
        public_id: Option<String>,
        system_id: Option<String>,
    },
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
    /// CDATA section
    CData(String),
    /// Comment. May structurally hold children; serialization preserves
    /// them after the comment form.
    Comment(String),
    /// Processing instruction
    ProcessingInstruction { target: String, data: String },
    /// Parentless forest container
    Fragment,
}

/// Element-specific data.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Tag name (qualified)
    pub(crate) name: QualName,
    /// Attributes in insertion order. Insertion order is the
    /// serialization order.
    pub(crate) attrs: Vec<Attribute>,
}

impl ElementData {
    pub fn name(&self) -> &QualName {
        &self.name
    }

    /// Attributes in insertion order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attrs
    }

    /// Look up an attribute by qualified name.
    pub fn attr(&self, qualified: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|a| a.name().qualified() == qualified)
    }

    /// Look up an attribute by namespace URI and local name.
    pub fn attr_ns(&self, namespace: Option<&str>, local: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|a| a.name().matches_ns(namespace, local))
    }

    pub(crate) fn attr_index(&self, qualified: &str) -> Option<usize> {
        self.attrs.iter().position(|a| a.name().qualified() == qualified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_names() {
        assert_eq!(Node::document().node_name(), "#document");
        assert_eq!(Node::detached(NodeData::Text("x".into())).node_name(), "#text");
        assert_eq!(
            Node::detached(NodeData::CData("x".into())).node_name(),
            "#cdata-section"
        );
        assert_eq!(
            Node::detached(NodeData::Comment("x".into())).node_name(),
            "#comment"
        );
        assert_eq!(Node::detached(NodeData::Fragment).node_name(), "#document-fragment");
        assert_eq!(
            Node::detached(NodeData::ProcessingInstruction {
                target: "xml-stylesheet".into(),
                data: String::new(),
            })
            .node_name(),
            "xml-stylesheet"
        );

        let el = Node::element(QualName::local("div"), Vec::new());
        assert_eq!(el.node_name(), "div");
        assert_eq!(el.node_type(), NodeType::Element);
    }

    #[test]
    fn test_element_attr_lookup() {
        let attrs = vec![
            Attribute::new(QualName::local("id"), "a"),
            Attribute::new(QualName::new("x:lang", Some("urn:x")), "en"),
        ];
        let node = Node::element(QualName::local("p"), attrs);
        let el = node.as_element().unwrap();

        assert_eq!(el.attr("id").map(Attribute::value), Some("a"));
        assert!(el.attr("lang").is_none());
        assert_eq!(el.attr_ns(Some("urn:x"), "lang").map(Attribute::value), Some("en"));
        assert_eq!(el.attr_index("x:lang"), Some(1));
    }
}
