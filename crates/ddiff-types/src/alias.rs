//! Alias references between design tokens.
//!
//! A token value of the exact form `{other-token-name}` points at another
//! token. References are recognised here but never resolved: for diffing they
//! are ordinary strings.

use std::fmt;

/// A parsed `{token-name}` reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AliasRef<'a> {
    target: &'a str,
}

impl<'a> AliasRef<'a> {
    /// Parse a reference. The name must be non-empty and contain no braces.
    pub fn parse(value: &'a str) -> Option<Self> {
        let target = value.strip_prefix('{')?.strip_suffix('}')?;
        if target.is_empty() || target.contains(['{', '}']) {
            return None;
        }
        Some(Self { target })
    }

    /// The referenced token name.
    pub fn target(&self) -> &'a str {
        self.target
    }
}

impl fmt::Display for AliasRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_reference() {
        let alias = AliasRef::parse("{blue-800}").unwrap();
        assert_eq!(alias.target(), "blue-800");
        assert_eq!(alias.to_string(), "{blue-800}");
    }

    #[test]
    fn rejects_non_references() {
        assert!(AliasRef::parse("blue-800").is_none());
        assert!(AliasRef::parse("{}").is_none());
        assert!(AliasRef::parse("{a}{b}").is_none());
        assert!(AliasRef::parse("{blue-800").is_none());
        assert!(AliasRef::parse("rgb(0, 0, 0)").is_none());
    }
}
