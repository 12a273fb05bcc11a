//! Error types for tree mutation and serialization.

use std::io;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
///
/// Contract violations surface here, synchronously. Broken internal link
/// invariants are defects and panic instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// The node does not exist, or a removal named a parent that does not
    /// currently own the child.
    #[error("node not found")]
    NotFound,

    /// Structural contract violation.
    #[error("invalid state: {0}")]
    State(&'static str),

    /// Insertion would make a node its own ancestor.
    #[error("hierarchy request error")]
    HierarchyRequest,

    /// Insertion index past the end of the child sequence.
    #[error("index out of range")]
    IndexSize,

    /// Surface that fails fast instead of returning a sentinel.
    #[error("not implemented: {0}")]
    Unsupported(&'static str),
}

/// Serialization failures
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// A document fragment serializes as the concatenation of its
    /// children; with zero children there is nothing defined to emit.
    #[error("document fragment has no children")]
    EmptyFragment,

    #[error(transparent)]
    Io(#[from] io::Error),
}
