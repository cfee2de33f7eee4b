//! Qualified names for design units.

use std::fmt;

use smol_str::SmolStr;

/// A `library.unit` identifier disambiguating identical unit names
/// across libraries and blocks.
///
/// Both segments are lowercase-normalized at construction, so lookups
/// never need to case-fold. HDL identifiers are case-insensitive.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct QualifiedName {
    library: SmolStr,
    name: SmolStr,
}

impl QualifiedName {
    /// Create a qualified name from its two segments.
    pub fn new(library: &str, name: &str) -> Self {
        Self {
            library: SmolStr::new(library.to_ascii_lowercase()),
            name: SmolStr::new(name.to_ascii_lowercase()),
        }
    }

    /// Parse dotted text like `ieee.std_logic_1164` into a qualified name.
    ///
    /// Returns `None` when there is no dot or either segment is empty.
    /// Text with more than one dot keeps everything after the first dot
    /// as the unit name; callers that care about `lib.pkg.item` forms
    /// split those themselves.
    pub fn parse(text: &str) -> Option<Self> {
        let (library, name) = text.split_once('.')?;
        if library.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(library, name))
    }

    /// The library segment.
    pub fn library(&self) -> &str {
        &self.library
    }

    /// The unit segment.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.library, self.name)
    }
}

impl fmt::Debug for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QualifiedName({}.{})", self.library, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_normalization() {
        let name = QualifiedName::new("Gates", "AND_Gate");
        assert_eq!(name.library(), "gates");
        assert_eq!(name.name(), "and_gate");
        assert_eq!(name.to_string(), "gates.and_gate");
    }

    #[test]
    fn test_parse() {
        let name = QualifiedName::parse("ieee.std_logic_1164").unwrap();
        assert_eq!(name.library(), "ieee");
        assert_eq!(name.name(), "std_logic_1164");

        assert!(QualifiedName::parse("no_dot").is_none());
        assert!(QualifiedName::parse(".empty").is_none());
        assert!(QualifiedName::parse("empty.").is_none());
    }

    #[test]
    fn test_equality_ignores_case() {
        let a = QualifiedName::new("lib", "unit");
        let b = QualifiedName::new("LIB", "Unit");
        assert_eq!(a, b);
    }
}
