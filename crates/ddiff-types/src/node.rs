//! The tree data model: scalars, ordered trees, lists, and the absent marker.
//!
//! Inputs are decoded JSON. Every input is normalized once at the boundary
//! (see [`crate::Normalizer`]) so the diff engine can match exhaustively on
//! [`Node`] instead of probing shapes at every step.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map, Number, Value};

use crate::alias::AliasRef;
use crate::path::TreePath;

/// A leaf value.
#[derive(Clone, Debug)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl Scalar {
    /// The string content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean content, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The alias reference this scalar encodes, if it is a `{token-name}` string.
    pub fn alias(&self) -> Option<AliasRef<'_>> {
        self.as_str().and_then(AliasRef::parse)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(_) => "boolean",
            Scalar::Number(_) => "number",
            Scalar::String(_) => "string",
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Number(n) => Value::Number(n.clone()),
            Scalar::String(s) => Value::String(s.clone()),
        }
    }
}

/// Numbers compare by value, so `1` and `1.0` are the same scalar.
impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Number(a), Scalar::Number(b)) => NumericKey::of(a) == NumericKey::of(b),
            (Scalar::String(a), Scalar::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Scalar {}

/// Canonical numeric identity shared by equality and fingerprinting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NumericKey {
    Int(i128),
    Float(u64),
}

impl NumericKey {
    const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

    pub(crate) fn of(n: &Number) -> Self {
        if let Some(i) = n.as_i64() {
            return Self::Int(i128::from(i));
        }
        if let Some(u) = n.as_u64() {
            return Self::Int(i128::from(u));
        }
        // Without arbitrary precision every remaining number is an f64.
        match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() <= Self::MAX_EXACT_FLOAT => Self::Int(f as i128),
            Some(f) => Self::Float(f.to_bits()),
            None => Self::Float(0),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n.into())
    }
}

impl From<u64> for Scalar {
    fn from(n: u64) -> Self {
        Scalar::Number(n.into())
    }
}

/// One position in a tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Scalar(Scalar),
    Tree(Tree),
    List(Vec<Node>),
    /// Marks a field that existed in the original snapshot and was removed.
    /// Produced only by the diff engine; serializes as `null`.
    Absent,
}

impl Node {
    pub fn is_absent(&self) -> bool {
        matches!(self, Node::Absent)
    }

    /// Returns `true` for trees and lists.
    pub fn is_container(&self) -> bool {
        matches!(self, Node::Tree(_) | Node::List(_))
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Node::Tree(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_scalar().and_then(Scalar::as_bool)
    }

    /// Human-readable name of the node's shape.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Scalar(s) => s.kind_name(),
            Node::Tree(_) => "object",
            Node::List(_) => "array",
            Node::Absent => "absent",
        }
    }

    /// View a container as an index-keyed tree. Lists become
    /// `{"0": .., "1": ..}`; trees are cloned. Scalars yield `None`.
    pub fn to_keyed_tree(&self) -> Option<Tree> {
        match self {
            Node::Tree(t) => Some(t.clone()),
            Node::List(items) => Some(Tree::from_list(items)),
            _ => None,
        }
    }

    /// Convert back into a JSON value. `Absent` becomes `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Node::Scalar(s) => s.to_json(),
            Node::Tree(t) => t.to_json(),
            Node::List(items) => Value::Array(items.iter().map(Node::to_json).collect()),
            Node::Absent => Value::Null,
        }
    }
}

impl From<Scalar> for Node {
    fn from(s: Scalar) -> Self {
        Node::Scalar(s)
    }
}

impl From<Tree> for Node {
    fn from(t: Tree) -> Self {
        Node::Tree(t)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Scalar(s.into())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Scalar(s.into())
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Scalar(b.into())
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Scalar(n.into())
    }
}

/// An insertion-ordered mapping from keys to nodes.
///
/// Equality ignores key order: two trees are equal when they hold the same
/// keys with equal nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    entries: IndexMap<String, Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Build an index-keyed tree from list items.
    pub fn from_list(items: &[Node]) -> Self {
        items
            .iter()
            .enumerate()
            .map(|(i, node)| (i.to_string(), node.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries.get_mut(key)
    }

    /// The child tree under `key`, if it is a tree.
    pub fn get_tree(&self, key: &str) -> Option<&Tree> {
        self.get(key).and_then(Node::as_tree)
    }

    /// The string scalar under `key`, if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Node::as_str)
    }

    /// Resolve a path from this tree. List segments are decimal indexes.
    pub fn get_path(&self, path: &TreePath) -> Option<&Node> {
        let (first, rest) = path.segments().split_first()?;
        let mut current = self.get(first)?;
        for segment in rest {
            current = match current {
                Node::Tree(t) => t.get(segment)?,
                Node::List(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Insert or replace an entry. Replacing keeps the key's original position.
    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<Node>) -> Option<Node> {
        self.entries.insert(key.into(), node.into())
    }

    /// Remove an entry, preserving the order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.entries.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Node> {
        self.entries.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keep only the entries for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &Node) -> bool) {
        self.entries.retain(|k, v| keep(k, v));
    }

    /// Convert back into a JSON object.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        Value::Object(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for Tree {
    fn from_iter<I: IntoIterator<Item = (K, Node)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl IntoIterator for Tree {
    type Item = (String, Node);
    type IntoIter = indexmap::map::IntoIter<String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = (&'a String, &'a Node);
    type IntoIter = indexmap::map::Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Number(n) => n.serialize(serializer),
            Scalar::String(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Scalar(s) => s.serialize(serializer),
            Node::Tree(t) => t.serialize(serializer),
            Node::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Absent => serializer.serialize_none(),
        }
    }
}

impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(pairs: &[(&str, Node)]) -> Tree {
        pairs.iter().map(|(k, v)| (*k, v.clone())).collect()
    }

    #[test]
    fn integer_and_float_numbers_are_equal() {
        let int = Scalar::Number(1.into());
        let float = Scalar::Number(Number::from_f64(1.0).unwrap());
        assert_eq!(int, float);

        let half = Scalar::Number(Number::from_f64(1.5).unwrap());
        assert_ne!(int, half);
    }

    #[test]
    fn scalars_of_different_kinds_differ() {
        assert_ne!(Scalar::from("1"), Scalar::from(1i64));
        assert_ne!(Scalar::Null, Scalar::Bool(false));
    }

    #[test]
    fn tree_equality_ignores_key_order() {
        let a = tree(&[("x", 1i64.into()), ("y", 2i64.into())]);
        let b = tree(&[("y", 2i64.into()), ("x", 1i64.into())]);
        assert_eq!(a, b);
        assert_eq!(a.keys().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(b.keys().collect::<Vec<_>>(), vec!["y", "x"]);
    }

    #[test]
    fn insert_replacement_keeps_position() {
        let mut t = tree(&[("a", 1i64.into()), ("b", 2i64.into())]);
        t.insert("a", Node::from(3i64));
        assert_eq!(t.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(t.get("a"), Some(&Node::from(3i64)));
    }

    #[test]
    fn remove_preserves_order() {
        let mut t = tree(&[("a", 1i64.into()), ("b", 2i64.into()), ("c", 3i64.into())]);
        t.remove("b");
        assert_eq!(t.keys().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn get_path_walks_trees_and_lists() {
        let inner = tree(&[("value", "#fff".into())]);
        let sets = tree(&[("light", Node::Tree(inner))]);
        let root = tree(&[
            ("sets", Node::Tree(sets)),
            ("list", Node::List(vec!["a".into(), "b".into()])),
        ]);

        let path = TreePath::from_segments(["sets", "light", "value"]);
        assert_eq!(root.get_path(&path).and_then(Node::as_str), Some("#fff"));

        let idx = TreePath::from_segments(["list", "1"]);
        assert_eq!(root.get_path(&idx).and_then(Node::as_str), Some("b"));

        assert!(root.get_path(&TreePath::from_segments(["list", "9"])).is_none());
        assert!(root.get_path(&TreePath::root()).is_none());
    }

    #[test]
    fn list_converts_to_index_keyed_tree() {
        let list = Node::List(vec!["a".into(), "b".into()]);
        let keyed = list.to_keyed_tree().unwrap();
        assert_eq!(keyed.keys().collect::<Vec<_>>(), vec!["0", "1"]);
        assert!(Node::from("x").to_keyed_tree().is_none());
    }

    #[test]
    fn absent_serializes_as_null() {
        let t = tree(&[("gone", Node::Absent), ("kept", "v".into())]);
        assert_eq!(serde_json::to_value(&t).unwrap(), json!({"gone": null, "kept": "v"}));
        assert_eq!(t.to_json(), json!({"gone": null, "kept": "v"}));
    }

    #[test]
    fn alias_scalar_is_recognised() {
        let s = Scalar::from("{gray-100}");
        assert_eq!(s.alias().map(|a| a.target()), Some("gray-100"));
        assert!(Scalar::from("#ffffff").alias().is_none());
    }
}
