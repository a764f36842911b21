//! Paths addressing nodes inside a tree.

use std::fmt;

use serde::{Serialize, Serializer};

/// An ordered list of key segments from a tree root to a node.
///
/// List elements are addressed by their decimal index. Paths display
/// dot-joined (`sets.dark.value`); the empty path displays as `<root>`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreePath(Vec<String>);

impl TreePath {
    /// The root path (no segments).
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from any sequence of segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// A new path one segment deeper.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// Append a segment in place.
    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }

    /// Remove and return the last segment.
    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    /// The individual segments.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first segment, if any.
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// The last segment, if any.
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Returns `true` if this path begins with the given segments.
    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        prefix.len() <= self.0.len() && self.0.iter().zip(prefix).all(|(a, b)| a == b)
    }

    /// The path with its first `n` segments removed.
    pub fn strip_prefix_len(&self, n: usize) -> Self {
        Self(self.0.iter().skip(n).cloned().collect())
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        f.write_str(&self.0.join("."))
    }
}

impl Serialize for TreePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<S: Into<String>> FromIterator<S> for TreePath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_segments(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_displays_placeholder() {
        assert_eq!(TreePath::root().to_string(), "<root>");
        assert!(TreePath::root().is_root());
    }

    #[test]
    fn segments_join_with_dots() {
        let path = TreePath::from_segments(["sets", "dark", "value"]);
        assert_eq!(path.to_string(), "sets.dark.value");
        assert_eq!(path.first(), Some("sets"));
        assert_eq!(path.last(), Some("value"));
    }

    #[test]
    fn child_does_not_alias_parent() {
        let parent = TreePath::from_segments(["a"]);
        let child = parent.child("b");
        assert_eq!(parent.len(), 1);
        assert_eq!(child.to_string(), "a.b");
    }

    #[test]
    fn prefix_checks() {
        let path = TreePath::from_segments(["properties", "size", "enum"]);
        assert!(path.starts_with(&["properties"]));
        assert!(path.starts_with(&["properties", "size"]));
        assert!(!path.starts_with(&["required"]));
        assert_eq!(path.strip_prefix_len(2).to_string(), "enum");
    }

    #[test]
    fn serializes_as_string() {
        let path = TreePath::from_segments(["meta", "category"]);
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"meta.category\"");
    }
}
