//! Detailed tree diff: partition the changes between two trees into added,
//! deleted, and updated trees, recursively at every level.
//!
//! - Keys only in `updated` land in `added` with their full subtree.
//! - Keys only in `original` land in `deleted`; scalars become
//!   [`Node::Absent`] and trees keep their shape with every leaf absent.
//! - Keys in both recurse when both sides are containers; differing scalars
//!   and shape changes (scalar vs container) are recorded in `updated` as the
//!   new value.
//!
//! Lists are compared positionally, as trees keyed by index. Reordering a list
//! therefore shows up as per-index updates rather than a move; this is a known
//! limitation of positional comparison. A list facing a tree at the same path
//! is compared as an index-keyed tree.
//!
//! Output order follows `updated` for `added` and `updated`, and `original`
//! for `deleted`.

use std::collections::HashMap;

use ddiff_types::{Node, Normalizer, Tree};
use serde::Serialize;
use serde_json::Value;

use crate::error::{DiffError, DiffResult, Side};

/// The result of comparing two trees, partitioned at every level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DetailedDiff {
    /// Entries present only in the updated tree.
    pub added: Tree,
    /// Entries present only in the original tree, leaves marked absent.
    pub deleted: Tree,
    /// Entries present in both whose values changed.
    pub updated: Tree,
}

impl DetailedDiff {
    /// Create an empty diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty() && self.updated.is_empty()
    }

    /// Number of top-level keys carrying additions.
    pub fn added_count(&self) -> usize {
        self.added.len()
    }

    /// Number of top-level keys carrying deletions.
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    /// Number of top-level keys carrying updates.
    pub fn updated_count(&self) -> usize {
        self.updated.len()
    }

    /// Deep-merge added, then updated, then deleted into a single tree.
    pub fn combined(&self) -> Tree {
        let mut result = Tree::new();
        deep_merge(&mut result, &self.added);
        deep_merge(&mut result, &self.updated);
        deep_merge(&mut result, &self.deleted);
        result
    }
}

/// The outcome of comparing two nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeDiff {
    /// The nodes are structurally equal.
    Unchanged,
    /// The node was replaced wholesale (scalar change or shape change).
    Replaced(Node),
    /// Both nodes are containers and differ somewhere inside.
    Nested(DetailedDiff),
}

impl NodeDiff {
    /// Returns `true` when diffing the two nodes produced no changes.
    pub fn is_empty(&self) -> bool {
        matches!(self, NodeDiff::Unchanged)
    }
}

/// Compare two trees.
pub fn diff_trees(original: &Tree, updated: &Tree) -> DetailedDiff {
    let mut result = DetailedDiff::new();
    let mut pending: HashMap<&str, NodeDiff> = HashMap::new();

    // Deletions follow the original tree's order.
    for (key, original_node) in original.iter() {
        match updated.get(key) {
            None => {
                result.deleted.insert(key, absent_shape(original_node));
            }
            Some(updated_node) => match diff_nodes(original_node, updated_node) {
                NodeDiff::Unchanged => {}
                NodeDiff::Nested(mut nested) => {
                    let deleted = std::mem::take(&mut nested.deleted);
                    if !deleted.is_empty() {
                        result.deleted.insert(key, Node::Tree(deleted));
                    }
                    pending.insert(key, NodeDiff::Nested(nested));
                }
                replaced => {
                    pending.insert(key, replaced);
                }
            },
        }
    }

    // Additions and updates follow the updated tree's order.
    for (key, updated_node) in updated.iter() {
        if !original.contains_key(key) {
            result.added.insert(key, updated_node.clone());
            continue;
        }
        match pending.remove(key) {
            Some(NodeDiff::Replaced(node)) => {
                result.updated.insert(key, node);
            }
            Some(NodeDiff::Nested(nested)) => {
                if !nested.added.is_empty() {
                    result.added.insert(key, Node::Tree(nested.added));
                }
                if !nested.updated.is_empty() {
                    result.updated.insert(key, Node::Tree(nested.updated));
                }
            }
            Some(NodeDiff::Unchanged) | None => {}
        }
    }

    result
}

/// Compare two nodes of any shape.
pub fn diff_nodes(original: &Node, updated: &Node) -> NodeDiff {
    match (original, updated) {
        (Node::Scalar(a), Node::Scalar(b)) => {
            if a == b {
                NodeDiff::Unchanged
            } else {
                NodeDiff::Replaced(updated.clone())
            }
        }
        (Node::Tree(a), Node::Tree(b)) => nested(diff_trees(a, b)),
        (Node::List(a), Node::List(b)) => nested(diff_trees(&Tree::from_list(a), &Tree::from_list(b))),
        (Node::Tree(a), Node::List(b)) => nested(diff_trees(a, &Tree::from_list(b))),
        (Node::List(a), Node::Tree(b)) => nested(diff_trees(&Tree::from_list(a), b)),
        (Node::Absent, Node::Absent) => NodeDiff::Unchanged,
        _ => NodeDiff::Replaced(updated.clone()),
    }
}

/// Returns `true` when diffing the two nodes yields no changes.
pub fn is_unchanged(original: &Node, updated: &Node) -> bool {
    diff_nodes(original, updated).is_empty()
}

/// Normalize two decoded JSON snapshots and compare them.
pub fn diff_values(
    original: &Value,
    updated: &Value,
    normalizer: &Normalizer,
) -> DiffResult<DetailedDiff> {
    let original = normalizer
        .tree(original)
        .map_err(|e| DiffError::malformed(Side::Original, e))?;
    let updated = normalizer
        .tree(updated)
        .map_err(|e| DiffError::malformed(Side::Updated, e))?;
    Ok(diff_trees(&original, &updated))
}

/// Only the additions between two trees.
pub fn added_diff(original: &Tree, updated: &Tree) -> Tree {
    diff_trees(original, updated).added
}

/// Only the deletions between two trees.
pub fn deleted_diff(original: &Tree, updated: &Tree) -> Tree {
    diff_trees(original, updated).deleted
}

/// Only the updates between two trees.
pub fn updated_diff(original: &Tree, updated: &Tree) -> Tree {
    diff_trees(original, updated).updated
}

/// All changes between two trees merged into one tree.
pub fn combined_diff(original: &Tree, updated: &Tree) -> Tree {
    diff_trees(original, updated).combined()
}

/// The top-level key partition between two trees.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyPartition<'a> {
    /// Keys only in the updated tree, in updated order.
    pub added: Vec<&'a str>,
    /// Keys only in the original tree, in original order.
    pub deleted: Vec<&'a str>,
    /// Keys in both trees, in updated order.
    pub common: Vec<&'a str>,
}

/// Partition the top-level keys of two trees.
pub fn partition_keys<'a>(original: &'a Tree, updated: &'a Tree) -> KeyPartition<'a> {
    let mut partition = KeyPartition::default();
    for key in original.keys() {
        if !updated.contains_key(key) {
            partition.deleted.push(key);
        }
    }
    for key in updated.keys() {
        if original.contains_key(key) {
            partition.common.push(key);
        } else {
            partition.added.push(key);
        }
    }
    partition
}

fn nested(diff: DetailedDiff) -> NodeDiff {
    if diff.is_empty() {
        NodeDiff::Unchanged
    } else {
        NodeDiff::Nested(diff)
    }
}

/// The deleted representation of a node: scalars become absent, containers
/// keep their keys with every leaf absent.
pub(crate) fn absent_shape(node: &Node) -> Node {
    match node {
        Node::Scalar(_) | Node::Absent => Node::Absent,
        Node::Tree(tree) => Node::Tree(
            tree.iter()
                .map(|(key, child)| (key, absent_shape(child)))
                .collect(),
        ),
        Node::List(items) => Node::Tree(
            items
                .iter()
                .enumerate()
                .map(|(i, child)| (i.to_string(), absent_shape(child)))
                .collect(),
        ),
    }
}

fn deep_merge(target: &mut Tree, source: &Tree) {
    for (key, value) in source.iter() {
        if let (Some(Node::Tree(existing)), Node::Tree(incoming)) = (target.get_mut(key), value) {
            deep_merge(existing, incoming);
            continue;
        }
        target.insert(key, value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn tree(value: Value) -> Tree {
        Tree::from_json(&value).unwrap()
    }

    #[test]
    fn identical_trees_no_diff() {
        let t = tree(json!({"a": 1, "b": {"c": [1, 2]}}));
        let diff = diff_trees(&t, &t);
        assert!(diff.is_empty());
    }

    #[test]
    fn nested_addition_and_update() {
        let original = tree(json!({"a": 1, "b": {"c": 2}}));
        let updated = tree(json!({"a": 1, "b": {"c": 3, "d": 4}}));

        let diff = diff_trees(&original, &updated);
        assert_eq!(diff.added, tree(json!({"b": {"d": 4}})));
        assert_eq!(diff.updated, tree(json!({"b": {"c": 3}})));
        assert!(diff.deleted.is_empty());
    }

    #[test]
    fn empty_to_populated_all_additions() {
        let updated = tree(json!({"x": 1, "y": {"z": "new"}}));
        let diff = diff_trees(&Tree::new(), &updated);
        assert_eq!(diff.added, updated);
        assert!(diff.deleted.is_empty());
        assert!(diff.updated.is_empty());
    }

    #[test]
    fn populated_to_empty_all_deletions() {
        let original = tree(json!({"x": 1, "y": {"z": "old", "w": [1, 2]}}));
        let diff = diff_trees(&original, &Tree::new());

        assert_eq!(diff.deleted.get("x"), Some(&Node::Absent));
        let y = diff.deleted.get_tree("y").unwrap();
        assert_eq!(y.get("z"), Some(&Node::Absent));
        let w = y.get_tree("w").unwrap();
        assert_eq!(w.keys().collect::<Vec<_>>(), vec!["0", "1"]);
        assert!(w.values().all(Node::is_absent));
    }

    #[test]
    fn deleted_nested_field_is_absent_not_omitted() {
        let original = tree(json!({"token": {"value": "#fff", "deprecated": true}}));
        let updated = tree(json!({"token": {"value": "#fff"}}));

        let diff = diff_trees(&original, &updated);
        assert_eq!(
            diff.deleted.get_tree("token").and_then(|t| t.get("deprecated")),
            Some(&Node::Absent)
        );
        assert!(diff.added.is_empty());
        assert!(diff.updated.is_empty());
    }

    #[test]
    fn scalar_to_tree_is_replacement() {
        let original = tree(json!({"value": "#fff"}));
        let updated = tree(json!({"value": {"light": "#fff"}}));

        let diff = diff_trees(&original, &updated);
        assert_eq!(diff.updated, updated);
        assert!(diff.added.is_empty());
        assert!(diff.deleted.is_empty());
    }

    #[test]
    fn type_change_detected() {
        let original = tree(json!({"value": 42}));
        let updated = tree(json!({"value": "forty-two"}));
        let diff = diff_trees(&original, &updated);
        assert_eq!(diff.updated.get("value").and_then(Node::as_str), Some("forty-two"));
    }

    #[test]
    fn null_value_handling() {
        let original = tree(json!({"nullable": null}));
        let updated = tree(json!({"nullable": "not null"}));
        let diff = diff_trees(&original, &updated);
        assert_eq!(diff.updated_count(), 1);
    }

    #[test]
    fn list_compared_positionally() {
        let original = tree(json!({"arrayProp": [1, 2, 3]}));
        let updated = tree(json!({"arrayProp": [1, 2, 3, 4]}));

        let diff = diff_trees(&original, &updated);
        assert_eq!(diff.added, tree(json!({"arrayProp": {"3": 4}})));
        assert!(diff.updated.is_empty());
        assert!(diff.deleted.is_empty());
    }

    #[test]
    fn list_reorder_is_per_index_update() {
        let original = tree(json!({"enum": ["s", "m"]}));
        let updated = tree(json!({"enum": ["m", "s"]}));

        let diff = diff_trees(&original, &updated);
        assert_eq!(diff.updated, tree(json!({"enum": {"0": "m", "1": "s"}})));
        assert!(diff.added.is_empty());
        assert!(diff.deleted.is_empty());
    }

    #[test]
    fn list_shrink_deletes_trailing_indexes() {
        let original = tree(json!({"required": ["a", "b", "c"]}));
        let updated = tree(json!({"required": ["a"]}));

        let diff = diff_trees(&original, &updated);
        let required = diff.deleted.get_tree("required").unwrap();
        assert_eq!(required.keys().collect::<Vec<_>>(), vec!["1", "2"]);
    }

    #[test]
    fn list_facing_tree_compares_by_index() {
        let original = tree(json!({"items": ["a", "b"]}));
        let updated = tree(json!({"items": {"0": "a", "1": "c"}}));

        let diff = diff_trees(&original, &updated);
        assert_eq!(diff.updated, tree(json!({"items": {"1": "c"}})));
        assert!(diff.added.is_empty());
        assert!(diff.deleted.is_empty());
    }

    #[test]
    fn output_order_follows_inputs() {
        let original = tree(json!({"d2": 1, "d1": 1, "u": 1, "keep": 1}));
        let updated = tree(json!({"a2": 1, "u": 2, "a1": 1, "keep": 1}));

        let diff = diff_trees(&original, &updated);
        assert_eq!(diff.added.keys().collect::<Vec<_>>(), vec!["a2", "a1"]);
        assert_eq!(diff.deleted.keys().collect::<Vec<_>>(), vec!["d2", "d1"]);
        assert_eq!(diff.updated.keys().collect::<Vec<_>>(), vec!["u"]);
    }

    #[test]
    fn inputs_are_not_mutated() {
        let original = tree(json!({"a": {"b": 1}}));
        let updated = tree(json!({"a": {"b": 2, "c": 3}}));
        let before = (original.clone(), updated.clone());
        let _ = diff_trees(&original, &updated);
        assert_eq!((original, updated), before);
    }

    #[test]
    fn diff_values_reports_malformed_side() {
        let err = diff_values(&json!({}), &json!("scalar"), &Normalizer::default()).unwrap_err();
        assert!(matches!(err, DiffError::Malformed { side: Side::Updated, .. }));
        assert!(err.to_string().starts_with("updated snapshot is malformed"));
    }

    #[test]
    fn diff_values_accepts_null_snapshots() {
        let diff = diff_values(&Value::Null, &json!({"a": 1}), &Normalizer::default()).unwrap();
        assert_eq!(diff.added_count(), 1);
    }

    #[test]
    fn projections_match_detailed_diff() {
        let original = tree(json!({
            "name": "test-token",
            "value": "#FF0000",
            "nested": {"property": "value1", "deep": {"level": "original"}},
            "gone": true
        }));
        let updated = tree(json!({
            "name": "test-token",
            "value": "#00FF00",
            "newProp": "added",
            "nested": {"property": "value2", "deep": {"level": "updated"}, "newNested": "added"}
        }));

        let added = added_diff(&original, &updated);
        assert_eq!(added, tree(json!({"newProp": "added", "nested": {"newNested": "added"}})));

        let updated_only = updated_diff(&original, &updated);
        assert_eq!(
            updated_only,
            tree(json!({"value": "#00FF00", "nested": {"property": "value2", "deep": {"level": "updated"}}}))
        );

        let deleted = deleted_diff(&original, &updated);
        assert_eq!(deleted.get("gone"), Some(&Node::Absent));

        let combined = combined_diff(&original, &updated);
        let nested = combined.get_tree("nested").unwrap();
        assert_eq!(nested.get_str("property"), Some("value2"));
        assert_eq!(nested.get_str("newNested"), Some("added"));
        assert_eq!(combined.get("gone"), Some(&Node::Absent));
        assert!(combined.get("name").is_none());
    }

    #[test]
    fn partition_keys_orders_each_group() {
        let original = tree(json!({"b": 1, "gone": 1, "a": 1}));
        let updated = tree(json!({"a": 1, "new": 1, "b": 2}));
        let keys = partition_keys(&original, &updated);
        assert_eq!(keys.added, vec!["new"]);
        assert_eq!(keys.deleted, vec!["gone"]);
        assert_eq!(keys.common, vec!["a", "b"]);
    }

    #[test]
    fn node_diff_on_scalars() {
        assert!(is_unchanged(&Node::from("x"), &Node::from("x")));
        assert_eq!(
            diff_nodes(&Node::from("x"), &Node::from("y")),
            NodeDiff::Replaced(Node::from("y"))
        );
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            (-5i64..5).prop_map(|n| json!(n)),
            "[a-c]{0,2}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                proptest::collection::btree_map("[a-d]", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn arb_tree() -> impl Strategy<Value = Tree> {
        proptest::collection::btree_map("[a-e]", arb_json(), 0..5)
            .prop_map(|m| Tree::from_json(&Value::Object(m.into_iter().collect())).unwrap())
    }

    proptest! {
        #[test]
        fn diff_with_self_is_empty(t in arb_tree()) {
            prop_assert!(diff_trees(&t, &t).is_empty());
        }

        #[test]
        fn swapped_arguments_swap_added_and_deleted_keys(a in arb_tree(), b in arb_tree()) {
            let forward = diff_trees(&a, &b);
            let backward = diff_trees(&b, &a);
            prop_assert_eq!(forward.added_count(), backward.deleted_count());
            for key in forward.added.keys() {
                prop_assert!(backward.deleted.contains_key(key));
            }
            for key in forward.deleted.keys() {
                prop_assert!(backward.added.contains_key(key));
            }
        }

        #[test]
        fn unchanged_keys_never_appear(a in arb_tree(), b in arb_tree()) {
            let diff = diff_trees(&a, &b);
            for (key, node) in a.iter() {
                if b.get(key).is_some_and(|other| is_unchanged(node, other)) {
                    prop_assert!(!diff.added.contains_key(key));
                    prop_assert!(!diff.deleted.contains_key(key));
                    prop_assert!(!diff.updated.contains_key(key));
                }
            }
        }
    }
}
