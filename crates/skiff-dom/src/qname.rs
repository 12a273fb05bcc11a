//! Qualified names
//!
//! A name of the form `prefix:local` or plain `local`, plus the namespace
//! URI supplied at construction. The split happens once, at the first
//! colon.

use std::borrow::Cow;
use std::fmt;

/// Namespaced name of an element or attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualName {
    qualified: String,
    /// Byte offset of the first colon, if any.
    colon: Option<usize>,
    namespace: Option<String>,
}

impl QualName {
    /// Create a qualified name in an optional namespace.
    pub fn new(qualified: &str, namespace: Option<&str>) -> Self {
        Self {
            qualified: qualified.to_string(),
            colon: qualified.find(':'),
            namespace: namespace.map(str::to_string),
        }
    }

    /// Create a name with no namespace.
    pub fn local(name: &str) -> Self {
        Self::new(name, None)
    }

    /// The full `prefix:local` form.
    #[inline]
    pub fn qualified(&self) -> &str {
        &self.qualified
    }

    /// The part before the first colon, if there is one.
    pub fn prefix(&self) -> Option<&str> {
        self.colon.map(|i| &self.qualified[..i])
    }

    /// The part after the first colon, or the whole name.
    pub fn local_name(&self) -> &str {
        match self.colon {
            Some(i) => &self.qualified[i + 1..],
            None => &self.qualified,
        }
    }

    /// Namespace URI supplied at construction.
    pub fn namespace_uri(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Local name as seen by a lookup.
    ///
    /// Path-query evaluation against a case-insensitive document folds the
    /// local name to lower case; every other lookup sees it verbatim. The
    /// caller decides via `fold_case` - there is no ambient flag.
    pub fn lookup_local_name(&self, fold_case: bool) -> Cow<'_, str> {
        let local = self.local_name();
        if fold_case && local.bytes().any(|b| b.is_ascii_uppercase()) {
            Cow::Owned(local.to_ascii_lowercase())
        } else {
            Cow::Borrowed(local)
        }
    }

    /// Whether this name matches a namespace/local pair exactly.
    pub fn matches_ns(&self, namespace: Option<&str>, local: &str) -> bool {
        self.namespace.as_deref() == namespace && self.local_name() == local
    }
}

impl fmt::Display for QualName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_at_first_colon() {
        let name = QualName::new("svg:a:b", Some("http://www.w3.org/2000/svg"));
        assert_eq!(name.qualified(), "svg:a:b");
        assert_eq!(name.prefix(), Some("svg"));
        assert_eq!(name.local_name(), "a:b");
        assert_eq!(name.namespace_uri(), Some("http://www.w3.org/2000/svg"));
    }

    #[test]
    fn test_no_prefix() {
        let name = QualName::local("div");
        assert_eq!(name.prefix(), None);
        assert_eq!(name.local_name(), "div");
        assert_eq!(name.namespace_uri(), None);
    }

    #[test]
    fn test_lookup_folding() {
        let name = QualName::local("DIV");
        assert_eq!(name.lookup_local_name(false), "DIV");
        assert_eq!(name.lookup_local_name(true), "div");

        // Already lower case: no allocation path, same result
        let lower = QualName::local("div");
        assert_eq!(lower.lookup_local_name(true), "div");
    }

    #[test]
    fn test_matches_ns() {
        let name = QualName::new("x:rect", Some("urn:shapes"));
        assert!(name.matches_ns(Some("urn:shapes"), "rect"));
        assert!(!name.matches_ns(None, "rect"));
        assert!(!name.matches_ns(Some("urn:shapes"), "x:rect"));
    }
}
