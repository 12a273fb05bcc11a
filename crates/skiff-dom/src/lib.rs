//! skiff DOM - live markup document tree
//!
//! Mutable in-memory representation of a hierarchical markup document:
//! structural and attribute mutation, synchronous change notification,
//! auto-invalidating live node lists, canonical-path addressing, and XML
//! re-serialization.

mod attr;
mod document;
mod error;
mod events;
mod generation;
mod id_index;
mod list;
mod node;
mod path;
mod qname;
mod serialize;
mod tree;

pub use attr::Attribute;
pub use document::{Document, DomConfig};
pub use error::{DomError, DomResult, SerializeError};
pub use events::{
    AttributeEvent, AttributeListener, CharDataEvent, MutationBus, StructureEvent,
    StructureListener,
};
pub use generation::Generation;
pub use id_index::IdIndex;
pub use list::{ChildTagFilter, LiveNodeList, NodeFilter, TagNameFilter};
pub use node::{ElementData, Node, NodeData, NodeType};
pub use qname::QualName;
pub use serialize::{as_xml, print_xml, save_xml};
pub use tree::{Ancestors, Children, Descendants, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Sentinel for an absent link
    pub(crate) const NONE: NodeId = NodeId(u32::MAX);

    /// The document node (arena slot 0)
    pub const DOCUMENT: NodeId = NodeId(0);

    #[inline]
    pub(crate) fn is_none(self) -> bool {
        self == Self::NONE
    }

    #[inline]
    pub(crate) fn get(self) -> Option<NodeId> {
        if self.is_none() { None } else { Some(self) }
    }
}
