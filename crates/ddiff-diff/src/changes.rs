//! Flatten a [`DetailedDiff`] into individual path-addressed change records.

use ddiff_types::{Node, Tree, TreePath};
use serde::Serialize;

use crate::tree_diff::DetailedDiff;

/// The kind of a single change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Deleted,
    Updated,
}

/// One change at a leaf of the diff, with the values on both sides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub path: TreePath,
    pub kind: ChangeKind,
    pub original_value: Option<Node>,
    pub new_value: Option<Node>,
}

impl ChangeRecord {
    /// Returns `true` if the change is at or below `prefix`.
    pub fn is_under(&self, prefix: &[&str]) -> bool {
        self.path.starts_with(prefix)
    }
}

/// Walk a diff and emit one record per change boundary.
///
/// Descends while both snapshots hold containers at the path; the first path
/// where that stops being true is reported with the values found there in the
/// original and updated trees. Records are ordered added, updated, deleted.
pub fn collect_changes(diff: &DetailedDiff, original: &Tree, updated: &Tree) -> Vec<ChangeRecord> {
    let mut records = Vec::new();
    let mut path = TreePath::root();
    for (kind, part) in [
        (ChangeKind::Added, &diff.added),
        (ChangeKind::Updated, &diff.updated),
        (ChangeKind::Deleted, &diff.deleted),
    ] {
        walk(part, kind, original, updated, &mut path, &mut records);
    }
    records
}

fn walk(
    part: &Tree,
    kind: ChangeKind,
    original: &Tree,
    updated: &Tree,
    path: &mut TreePath,
    records: &mut Vec<ChangeRecord>,
) {
    for (key, node) in part.iter() {
        path.push(key);
        let before = original.get_path(path);
        let after = updated.get_path(path);
        let both_containers =
            before.is_some_and(Node::is_container) && after.is_some_and(Node::is_container);

        match node {
            Node::Tree(children) if both_containers => {
                walk(children, kind, original, updated, path, records);
            }
            _ => records.push(ChangeRecord {
                path: path.clone(),
                kind,
                original_value: before.cloned(),
                new_value: after.cloned(),
            }),
        }
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree_diff::diff_trees;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> Tree {
        Tree::from_json(&value).unwrap()
    }

    #[test]
    fn records_leaf_changes_with_both_values() {
        let original = tree(json!({"color": {"value": "#fff", "type": "color"}}));
        let updated = tree(json!({"color": {"value": "#000", "type": "color", "note": "dark"}}));

        let diff = diff_trees(&original, &updated);
        let records = collect_changes(&diff, &original, &updated);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, ChangeKind::Added);
        assert_eq!(records[0].path.to_string(), "color.note");
        assert_eq!(records[0].original_value, None);
        assert_eq!(records[0].new_value, Some(Node::from("dark")));

        assert_eq!(records[1].kind, ChangeKind::Updated);
        assert_eq!(records[1].path.to_string(), "color.value");
        assert_eq!(records[1].original_value, Some(Node::from("#fff")));
        assert_eq!(records[1].new_value, Some(Node::from("#000")));
    }

    #[test]
    fn whole_subtree_added_is_one_record() {
        let original = tree(json!({}));
        let updated = tree(json!({"spacing": {"value": "4px"}}));

        let diff = diff_trees(&original, &updated);
        let records = collect_changes(&diff, &original, &updated);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path.to_string(), "spacing");
        assert!(records[0].new_value.as_ref().is_some_and(Node::is_container));
    }

    #[test]
    fn deleted_records_carry_original_value() {
        let original = tree(json!({"a": {"b": 1, "c": 2}}));
        let updated = tree(json!({"a": {"b": 1}}));

        let diff = diff_trees(&original, &updated);
        let records = collect_changes(&diff, &original, &updated);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, ChangeKind::Deleted);
        assert_eq!(records[0].path.to_string(), "a.c");
        assert_eq!(records[0].original_value, Some(Node::from(2i64)));
        assert_eq!(records[0].new_value, None);
    }

    #[test]
    fn shape_change_is_reported_at_boundary() {
        let original = tree(json!({"value": "#fff"}));
        let updated = tree(json!({"value": {"light": "#fff"}}));

        let diff = diff_trees(&original, &updated);
        let records = collect_changes(&diff, &original, &updated);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path.to_string(), "value");
        assert_eq!(records[0].kind, ChangeKind::Updated);
    }

    #[test]
    fn list_items_are_addressed_by_index() {
        let original = tree(json!({"enum": ["s", "m"]}));
        let updated = tree(json!({"enum": ["s", "l"]}));

        let diff = diff_trees(&original, &updated);
        let records = collect_changes(&diff, &original, &updated);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path.to_string(), "enum.1");
        assert_eq!(records[0].new_value, Some(Node::from("l")));
    }

    #[test]
    fn serializes_camel_case() {
        let record = ChangeRecord {
            path: TreePath::from_segments(["a", "b"]),
            kind: ChangeKind::Updated,
            original_value: Some(Node::from(1i64)),
            new_value: Some(Node::from(2i64)),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({"path": "a.b", "kind": "updated", "originalValue": 1, "newValue": 2})
        );
    }
}
