//! Build a [`TokenDiffReport`] from two token snapshots.

use std::collections::HashSet;

use ddiff_diff::{
    collect_changes, deprecation, diff_nodes, diff_trees, partition_keys, reclassify_deletions,
    ChangeKind, NodeDiff, RenameDetector, RenameOptions, DEPRECATED_COMMENT_KEY, DEPRECATED_KEY,
};
use ddiff_types::{Node, Tree, TreePath};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::report::{DeprecatedToken, PropertyChange, RenamedToken, TokenDiffReport};

/// Key of the platform override sub-tree inside a token.
pub const SETS_KEY: &str = "sets";

/// Options for token comparison.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenDiffOptions {
    pub rename: RenameOptions,
}

/// Compare two token snapshots.
pub fn compare_tokens(original: &Tree, updated: &Tree, options: &TokenDiffOptions) -> TokenDiffReport {
    let detector = RenameDetector::new(options.rename.clone());
    let diff = diff_trees(original, updated);
    let renames = detector.detect(original, updated);
    let keys = partition_keys(original, updated);
    let mut report = TokenDiffReport::default();

    for (old, new) in renames.iter() {
        report.renamed.insert(
            new.to_owned(),
            RenamedToken {
                old_name: old.to_owned(),
            },
        );
    }

    let targets: HashSet<&str> = renames.iter().map(|(_, new)| new).collect();
    for &key in &keys.added {
        if targets.contains(key) {
            continue;
        }
        if let Some(node) = updated.get(key) {
            report.added.insert(key, node.clone());
        }
    }

    for (key, mut entry) in reclassify_deletions(&diff.deleted, &renames, updated) {
        if let (Node::Tree(fields), Some(source)) = (&mut entry, original.get(&key)) {
            reattach_deprecation(fields, source);
        }
        report.deleted.insert(key, entry);
    }

    for &key in &keys.common {
        let (Some(before), Some(after)) = (original.get(key), updated.get(key)) else {
            continue;
        };

        let marker = match (deprecation(before), deprecation(after)) {
            (None, Some(dep)) => {
                report.deprecated.insert(
                    key.to_owned(),
                    DeprecatedToken {
                        deprecated: true,
                        deprecated_comment: dep.comment,
                    },
                );
                true
            }
            (Some(_), None) => {
                report.reverted.insert(key, after.clone());
                true
            }
            _ => false,
        };

        record_property_changes(&mut report, key, before, after, marker, &detector);
    }

    debug!(
        renamed = report.renamed.len(),
        deprecated = report.deprecated.len(),
        reverted = report.reverted.len(),
        added = report.added.len(),
        deleted = report.deleted.len(),
        updated = report.updated.token_count(),
        "token comparison complete"
    );
    report
}

fn record_property_changes(
    report: &mut TokenDiffReport,
    token: &str,
    before: &Node,
    after: &Node,
    skip_marker: bool,
    detector: &RenameDetector,
) {
    let diff = match diff_nodes(before, after) {
        NodeDiff::Unchanged => return,
        NodeDiff::Replaced(_) => {
            report.updated.push(
                token,
                ChangeKind::Updated,
                PropertyChange {
                    path: TreePath::root(),
                    new_value: Some(after.clone()),
                    original_value: Some(before.clone()),
                },
            );
            return;
        }
        NodeDiff::Nested(diff) => diff,
    };

    // Both sides are containers here; lists are compared as index-keyed trees.
    let (Some(before), Some(after)) = (before.to_keyed_tree(), after.to_keyed_tree()) else {
        return;
    };

    let set_renames = match (before.get_tree(SETS_KEY), after.get_tree(SETS_KEY)) {
        (Some(old_sets), Some(new_sets)) => detector.detect(old_sets, new_sets),
        _ => Default::default(),
    };

    for (old, new) in set_renames.iter() {
        report.updated.push_renamed(
            token,
            PropertyChange {
                path: TreePath::from_segments([SETS_KEY, new]),
                new_value: Some(Node::from(new)),
                original_value: Some(Node::from(old)),
            },
        );
    }

    for record in collect_changes(&diff, &before, &after) {
        if skip_marker && is_marker_path(&record.path) {
            continue;
        }
        if let Some(set) = set_segment(&record.path) {
            let renamed = match record.kind {
                ChangeKind::Deleted => set_renames.contains_source(set),
                ChangeKind::Added => set_renames.contains_target(set),
                ChangeKind::Updated => false,
            };
            if renamed {
                continue;
            }
        }
        let kind = record.kind;
        report.updated.push(token, kind, record.into());
    }
}

/// Copy the deprecation marker and comment of a removed token onto its
/// deletion record.
fn reattach_deprecation(fields: &mut Tree, source: &Node) {
    if deprecation(source).is_none() {
        return;
    }
    let Some(source) = source.as_tree() else {
        return;
    };
    for key in [DEPRECATED_KEY, DEPRECATED_COMMENT_KEY] {
        if let Some(value) = source.get(key) {
            fields.insert(key, value.clone());
        }
    }
}

fn is_marker_path(path: &TreePath) -> bool {
    path.len() == 1 && matches!(path.first(), Some(DEPRECATED_KEY | DEPRECATED_COMMENT_KEY))
}

/// The set name of a path directly under `sets`.
fn set_segment(path: &TreePath) -> Option<&str> {
    match path.segments() {
        [sets, name] if sets == SETS_KEY => Some(name.as_str()),
        _ => None,
    }
}
