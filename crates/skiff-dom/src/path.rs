//! Canonical path addressing
//!
//! Positional path strings for diagnostics. Parent structure can change
//! between calls, so every path is recomputed fresh; nothing here caches.

use crate::error::{DomError, DomResult};
use crate::node::{NodeData, NodeType};
use crate::document::Document;
use crate::NodeId;

/// Canonical positional path of `node`.
///
/// Elements address as `name` or `name[i]` (1-based among same-named
/// element siblings, the index elided when unique); text and CDATA as
/// `text()`, comments as `comment()`, processing instructions as
/// `processing-instruction(target)`, all with the same elision rule. The
/// document and fragment containers address as the empty string, so their
/// children start with `/`.
pub(crate) fn canonical_xpath(doc: &Document, node: NodeId) -> DomResult<String> {
    let n = doc.tree().get(node).ok_or(DomError::NotFound)?;
    match n.data() {
        NodeData::Document | NodeData::Fragment => Ok(String::new()),
        _ => {
            let parent_path = match doc.tree().parent(node) {
                Some(parent) => canonical_xpath(doc, parent)?,
                None => String::new(),
            };
            Ok(format!("{parent_path}/{}", path_token(doc, node)))
        }
    }
}

/// Canonical path of an attribute: owner element path + `/@` + name.
pub(crate) fn attribute_xpath(
    doc: &Document,
    element: NodeId,
    qualified: &str,
) -> DomResult<String> {
    doc.attribute_node(element, qualified)
        .ok_or(DomError::NotFound)?;
    let parent_path = canonical_xpath(doc, element)?;
    Ok(format!("{parent_path}/@{qualified}"))
}

/// One path step, with a 1-based position among same-kind siblings. The
/// position is elided when the node is the only sibling of its kind.
fn path_token(doc: &Document, node: NodeId) -> String {
    let tree = doc.tree();
    let n = tree.node(node);
    let kind = n.node_type();

    let same_kind = |candidate: NodeId| -> bool {
        let c = tree.node(candidate);
        match kind {
            NodeType::Element => {
                c.node_type() == NodeType::Element && c.node_name() == n.node_name()
            }
            // CDATA is character data to a path query, same as text
            NodeType::Text | NodeType::CDataSection => matches!(
                c.node_type(),
                NodeType::Text | NodeType::CDataSection
            ),
            NodeType::ProcessingInstruction => {
                c.node_type() == NodeType::ProcessingInstruction
                    && c.node_name() == n.node_name()
            }
            other => c.node_type() == other,
        }
    };

    let (total, position) = match tree.parent(node) {
        Some(parent) => {
            let mut total = 0;
            let mut position = 0;
            for child in tree.children(parent) {
                if same_kind(child) {
                    total += 1;
                    if child == node {
                        position = total;
                    }
                }
            }
            (total, position)
        }
        None => (1, 1),
    };

    let base = match n.data() {
        NodeData::Element(el) => el.name().qualified().to_string(),
        NodeData::Text(_) | NodeData::CData(_) => "text()".to_string(),
        NodeData::Comment(_) => "comment()".to_string(),
        NodeData::ProcessingInstruction { target, .. } => {
            format!("processing-instruction({target})")
        }
        NodeData::Doctype { .. } => "doctype()".to_string(),
        NodeData::Document | NodeData::Fragment => String::new(),
    };

    if total > 1 {
        format!("{base}[{position}]")
    } else {
        base
    }
}
