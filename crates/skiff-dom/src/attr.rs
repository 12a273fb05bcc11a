//! Element attributes
//!
//! A single namespaced name/value pair. The `specified` flag records
//! whether the value was explicitly given (as opposed to defaulted by a
//! grammar); any mutation marks the attribute specified.

use crate::error::{DomError, DomResult};
use crate::qname::QualName;

/// Attribute of an element.
#[derive(Debug, Clone)]
pub struct Attribute {
    name: QualName,
    value: String,
    specified: bool,
}

impl Attribute {
    /// Create an attribute with an explicitly given value.
    pub fn new(name: QualName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
            specified: true,
        }
    }

    /// Create an attribute carrying a defaulted value.
    pub fn defaulted(name: QualName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
            specified: false,
        }
    }

    pub fn name(&self) -> &QualName {
        &self.name
    }

    /// Raw attribute value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the value was explicitly set.
    pub fn is_specified(&self) -> bool {
        self.specified
    }

    /// Raw value write. Programmatic assignment always marks the
    /// attribute specified.
    pub(crate) fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.specified = true;
    }

    /// Re-key the attribute on rename by a containing element.
    pub(crate) fn set_name(&mut self, name: QualName) {
        self.name = name;
    }

    /// Schema type information is not supported.
    pub fn schema_type_info(&self) -> DomResult<()> {
        Err(DomError::Unsupported("schema type info"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specified_on_construction() {
        let attr = Attribute::new(QualName::local("id"), "a");
        assert!(attr.is_specified());

        let attr = Attribute::defaulted(QualName::local("type"), "text");
        assert!(!attr.is_specified());
    }

    #[test]
    fn test_mutation_marks_specified() {
        let mut attr = Attribute::defaulted(QualName::local("type"), "text");
        assert!(!attr.is_specified());

        attr.set_value("password");
        assert!(attr.is_specified());
        assert_eq!(attr.value(), "password");
    }

    #[test]
    fn test_schema_type_info_fails_fast() {
        let attr = Attribute::new(QualName::local("id"), "a");
        assert_eq!(
            attr.schema_type_info(),
            Err(DomError::Unsupported("schema type info"))
        );
    }
}
