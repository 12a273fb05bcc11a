//! Element factory protocol
//!
//! A parser resolves a tag name and hands over the raw attribute table;
//! a factory returns a detached element ready for insertion. How tag
//! names map to factories is the host's business - the core never
//! inspects it.

use skiff_dom::{Attribute, Document, DomResult, NodeId, QualName};

/// Raw attribute pair as produced by a parser, in source order.
pub type RawAttribute = (String, String);

/// Builds detached elements for a document.
pub trait ElementFactory {
    /// Build a detached element for `qualified_name` in `namespace`,
    /// carrying `attributes` in source order. The returned node satisfies
    /// the full node and namespaced-node contracts.
    fn create_element(
        &self,
        doc: &mut Document,
        qualified_name: &str,
        namespace: Option<&str>,
        attributes: &[RawAttribute],
    ) -> DomResult<NodeId>;
}

/// Stock factory for recognized markup.
#[derive(Debug, Default)]
pub struct DefaultElementFactory;

impl ElementFactory for DefaultElementFactory {
    fn create_element(
        &self,
        doc: &mut Document,
        qualified_name: &str,
        namespace: Option<&str>,
        attributes: &[RawAttribute],
    ) -> DomResult<NodeId> {
        Ok(build_element(doc, qualified_name, namespace, attributes))
    }
}

/// Fallback for tags no other factory claims. The produced element still
/// satisfies every node invariant, so generic tree algorithms never
/// special-case it.
#[derive(Debug, Default)]
pub struct UnknownElementFactory;

impl ElementFactory for UnknownElementFactory {
    fn create_element(
        &self,
        doc: &mut Document,
        qualified_name: &str,
        namespace: Option<&str>,
        attributes: &[RawAttribute],
    ) -> DomResult<NodeId> {
        tracing::trace!(tag = qualified_name, "building unknown tag");
        Ok(build_element(doc, qualified_name, namespace, attributes))
    }
}

fn build_element(
    doc: &mut Document,
    qualified_name: &str,
    namespace: Option<&str>,
    attributes: &[RawAttribute],
) -> NodeId {
    let name = QualName::new(qualified_name, namespace);
    let attrs = attributes
        .iter()
        .map(|(n, v)| Attribute::new(QualName::local(n), v.clone()))
        .collect();
    doc.create_element_with_attrs(name, attrs)
}
