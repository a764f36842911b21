//! Deletion reclassification.
//!
//! Filters the top-level `deleted` set after rename detection so only true
//! removals remain. An entry is dropped when it was the source of a rename, or
//! when its key still exists in the updated snapshot: that entry only records
//! fields removed from a surviving definition, which the caller reports as
//! updates. Deprecated definitions that were removed without a rename stay in
//! the result.

use ddiff_types::{Node, Scalar, Tree};
use tracing::debug;

use crate::rename::RenameMap;

/// Key of the deprecation marker on a definition.
pub const DEPRECATED_KEY: &str = "deprecated";

/// Key of the free-text deprecation comment on a definition.
pub const DEPRECATED_COMMENT_KEY: &str = "deprecated_comment";

/// A deprecation marker read from a definition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Deprecation {
    pub comment: Option<String>,
}

/// Read the deprecation marker of a definition, if it has one.
///
/// The marker is `deprecated: true` or a non-empty string. The comment comes
/// from a string marker first, then from `deprecated_comment`.
pub fn deprecation(node: &Node) -> Option<Deprecation> {
    let tree = node.as_tree()?;
    let comment = match tree.get(DEPRECATED_KEY)? {
        Node::Scalar(Scalar::Bool(true)) => None,
        Node::Scalar(Scalar::String(reason)) if !reason.is_empty() => Some(reason.clone()),
        _ => return None,
    };
    let comment = comment.or_else(|| {
        tree.get_str(DEPRECATED_COMMENT_KEY)
            .filter(|c| !c.is_empty())
            .map(str::to_owned)
    });
    Some(Deprecation { comment })
}

/// Filter a deleted set against detected renames and the updated snapshot.
pub fn reclassify_deletions(deleted: &Tree, renamed: &RenameMap, updated: &Tree) -> Tree {
    deleted
        .iter()
        .filter(|(key, _)| {
            if renamed.contains_source(key) {
                debug!(key = %key, "deletion reclassified as rename");
                return false;
            }
            !updated.contains_key(key)
        })
        .map(|(key, entry)| (key, entry.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rename::detect_renames;
    use crate::tree_diff::diff_trees;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> Tree {
        Tree::from_json(&value).unwrap()
    }

    #[test]
    fn renamed_source_is_dropped() {
        let original = tree(json!({"swatch-border-opacity-legacy": {"value": "0.2"}}));
        let updated = tree(json!({"swatch-border-opacity": {"value": "0.2"}}));

        let diff = diff_trees(&original, &updated);
        let renames = detect_renames(&original, &updated);
        let deleted = reclassify_deletions(&diff.deleted, &renames, &updated);

        assert!(diff.deleted.contains_key("swatch-border-opacity-legacy"));
        assert!(deleted.is_empty());
    }

    #[test]
    fn deprecated_without_rename_is_kept() {
        let deleted = tree(json!({"old-token": {"deprecated": "use new-token"}}));
        let kept = reclassify_deletions(&deleted, &RenameMap::new(), &Tree::new());
        assert_eq!(kept, deleted);
    }

    #[test]
    fn deprecated_but_renamed_is_dropped() {
        let deleted = tree(json!({"old-token": {"deprecated": true}}));
        let renames: RenameMap = [("old-token", "new-token")].into_iter().collect();
        assert!(reclassify_deletions(&deleted, &renames, &Tree::new()).is_empty());
    }

    #[test]
    fn whole_removal_is_kept() {
        let original = tree(json!({"gone": {"value": "1px", "sets": {"a": {"value": "2px"}}}}));
        let diff = diff_trees(&original, &Tree::new());
        let kept = reclassify_deletions(&diff.deleted, &RenameMap::new(), &Tree::new());
        assert!(kept.contains_key("gone"));
    }

    #[test]
    fn field_removed_from_surviving_token_is_dropped() {
        let original = tree(json!({"tok": {"value": "1px", "private": true}}));
        let updated = tree(json!({"tok": {"value": "1px"}}));

        let diff = diff_trees(&original, &updated);
        assert!(diff.deleted.contains_key("tok"));

        let kept = reclassify_deletions(&diff.deleted, &RenameMap::new(), &updated);
        assert!(kept.is_empty());
    }

    #[test]
    fn removed_deprecated_token_survives_full_pipeline() {
        let original = tree(json!({
            "old-token": {"value": "1px", "deprecated": "use new-token"},
            "kept": {"value": "2px", "deprecated": true}
        }));
        let updated = tree(json!({"kept": {"value": "3px"}}));

        let diff = diff_trees(&original, &updated);
        let renames = detect_renames(&original, &updated);
        let kept = reclassify_deletions(&diff.deleted, &renames, &updated);

        assert_eq!(kept.keys().collect::<Vec<_>>(), vec!["old-token"]);
    }

    #[test]
    fn deprecation_marker_forms() {
        let flagged = Node::Tree(tree(json!({"deprecated": true, "deprecated_comment": "use x"})));
        assert_eq!(
            deprecation(&flagged),
            Some(Deprecation { comment: Some("use x".into()) })
        );

        let reason = Node::Tree(tree(json!({"deprecated": "use y"})));
        assert_eq!(deprecation(&reason).and_then(|d| d.comment), Some("use y".into()));

        let bare = Node::Tree(tree(json!({"deprecated": true})));
        assert_eq!(deprecation(&bare), Some(Deprecation::default()));

        for value in [json!({"deprecated": false}), json!({"deprecated": ""}), json!({})] {
            assert_eq!(deprecation(&Node::Tree(tree(value))), None);
        }
        assert_eq!(deprecation(&Node::from("deprecated")), None);
    }
}
