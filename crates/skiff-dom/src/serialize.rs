//! XML serialization
//!
//! Recursive, indent-aware printer over the arena. Serialization is
//! read-only; it never touches links, the id index or the bus.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::document::Document;
use crate::error::SerializeError;
use crate::node::NodeData;
use crate::NodeId;

/// Child nodes indent two spaces below their parent.
const INDENT_STEP: &str = "  ";

/// Tags serialized in expanded form even when childless, so the output
/// stays valid HTML when re-parsed.
const EXPANDED_EMPTY_TAGS: &[&str] = &[
    "a", "div", "iframe", "p", "script", "span", "style", "textarea", "title",
];

/// Serialize `node` to its XML text form.
pub fn as_xml(doc: &Document, node: NodeId) -> Result<String, SerializeError> {
    let mut buf = Vec::new();
    print_xml(doc, node, "", &mut buf)?;
    Ok(String::from_utf8(buf).expect("serializer emits UTF-8"))
}

/// Serialize `node` into `out`, with `indent` prefixed to the first line.
pub fn print_xml<W: Write>(
    doc: &Document,
    node: NodeId,
    indent: &str,
    out: &mut W,
) -> Result<(), SerializeError> {
    match doc.tree().node(node).data() {
        NodeData::Document => print_children(doc, node, indent, out),
        NodeData::Fragment => {
            // A fragment has no tag of its own; it serializes as its
            // children, concatenated. Zero children is an explicit error,
            // never silently empty output.
            if doc.tree().first_child(node).is_none() {
                return Err(SerializeError::EmptyFragment);
            }
            print_children(doc, node, indent, out)
        }
        NodeData::Element(el) => {
            write!(out, "{indent}<{}", el.name().qualified())?;
            for attr in el.attributes() {
                write!(out, " {}=\"", attr.name().qualified())?;
                write_escaped_attr(out, attr.value())?;
                write!(out, "\"")?;
            }
            let has_children = doc.tree().first_child(node).is_some();
            if has_children || is_expanded_empty_tag(el.name().qualified()) {
                writeln!(out, ">")?;
                let child_indent = format!("{indent}{INDENT_STEP}");
                print_children(doc, node, &child_indent, out)?;
                writeln!(out, "{indent}</{}>", el.name().qualified())?;
            } else {
                writeln!(out, "/>")?;
            }
            Ok(())
        }
        NodeData::Text(data) => {
            write!(out, "{indent}")?;
            write_escaped_text(out, data)?;
            writeln!(out)?;
            Ok(())
        }
        NodeData::CData(data) => {
            writeln!(out, "{indent}<![CDATA[{data}]]>")?;
            Ok(())
        }
        NodeData::Comment(data) => {
            // Comments may structurally hold children in this model;
            // they follow the comment form.
            writeln!(out, "{indent}<!--{data}-->")?;
            let child_indent = format!("{indent}{INDENT_STEP}");
            print_children(doc, node, &child_indent, out)
        }
        NodeData::ProcessingInstruction { target, data } => {
            if data.is_empty() {
                writeln!(out, "{indent}<?{target}?>")?;
            } else {
                writeln!(out, "{indent}<?{target} {data}?>")?;
            }
            Ok(())
        }
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => {
            match (public_id, system_id) {
                (Some(public), Some(system)) => {
                    writeln!(out, "{indent}<!DOCTYPE {name} PUBLIC \"{public}\" \"{system}\">")?
                }
                (None, Some(system)) => {
                    writeln!(out, "{indent}<!DOCTYPE {name} SYSTEM \"{system}\">")?
                }
                _ => writeln!(out, "{indent}<!DOCTYPE {name}>")?,
            }
            Ok(())
        }
    }
}

/// Serialize `node` and write the whole buffer to `path` in one
/// filesystem call. The destination is left absent or whole on failure;
/// the error is still raised.
pub fn save_xml(
    doc: &Document,
    node: NodeId,
    path: impl AsRef<Path>,
) -> Result<(), SerializeError> {
    let xml = as_xml(doc, node)?;
    fs::write(path, xml)?;
    Ok(())
}

fn print_children<W: Write>(
    doc: &Document,
    node: NodeId,
    indent: &str,
    out: &mut W,
) -> Result<(), SerializeError> {
    let children: Vec<NodeId> = doc.tree().children(node).collect();
    for child in children {
        print_xml(doc, child, indent, out)?;
    }
    Ok(())
}

fn is_expanded_empty_tag(tag: &str) -> bool {
    EXPANDED_EMPTY_TAGS.iter().any(|t| tag.eq_ignore_ascii_case(t))
}

fn write_escaped_text<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    for ch in text.chars() {
        match ch {
            '&' => out.write_all(b"&amp;")?,
            '<' => out.write_all(b"&lt;")?,
            '>' => out.write_all(b"&gt;")?,
            _ => write!(out, "{ch}")?,
        }
    }
    Ok(())
}

fn write_escaped_attr<W: Write>(out: &mut W, value: &str) -> io::Result<()> {
    for ch in value.chars() {
        match ch {
            '&' => out.write_all(b"&amp;")?,
            '<' => out.write_all(b"&lt;")?,
            '"' => out.write_all(b"&quot;")?,
            _ => write!(out, "{ch}")?,
        }
    }
    Ok(())
}
