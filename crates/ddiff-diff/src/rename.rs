//! Rename detection across the top-level deleted and added keys of two trees.
//!
//! A deleted key `d` is paired with an added key `a` when diffing
//! `original[d]` against `updated[a]` yields no changes. Deleted keys are
//! visited in original order and added keys in updated order; the first
//! structural match wins. Candidates are bucketed by [`Fingerprint`] first so
//! the exact comparison only runs against subtrees that hash alike.
//!
//! Detection is one level deep: nested keys are never paired.

use std::collections::{HashMap, HashSet};

use ddiff_types::{Fingerprint, Tree};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tree_diff::{is_unchanged, partition_keys};

/// Mapping from a deleted key to the added key it was renamed to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenameMap {
    pairs: IndexMap<String, String>,
}

impl RenameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The new name of a renamed key.
    pub fn get(&self, old: &str) -> Option<&str> {
        self.pairs.get(old).map(String::as_str)
    }

    pub fn contains_source(&self, old: &str) -> bool {
        self.pairs.contains_key(old)
    }

    pub fn contains_target(&self, new: &str) -> bool {
        self.pairs.values().any(|target| target == new)
    }

    /// The first old name that was renamed to `new`.
    pub fn source_for(&self, new: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(_, target)| target.as_str() == new)
            .map(|(source, _)| source.as_str())
    }

    pub fn insert(&mut self, old: impl Into<String>, new: impl Into<String>) {
        self.pairs.insert(old.into(), new.into());
    }

    /// Iterate `(old, new)` pairs in detection order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<O: Into<String>, N: Into<String>> FromIterator<(O, N)> for RenameMap {
    fn from_iter<I: IntoIterator<Item = (O, N)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(o, n)| (o.into(), n.into())).collect(),
        }
    }
}

/// Rename matching policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameOptions {
    /// An added key may be claimed by at most one deleted key.
    pub exclusive_targets: bool,
    /// Minimum character-level similarity between the old and new key names,
    /// in `0.0..=1.0`. `None` matches on structure alone.
    pub min_name_similarity: Option<f32>,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            exclusive_targets: true,
            min_name_similarity: None,
        }
    }
}

/// Pairs deleted keys with structurally identical added keys.
#[derive(Clone, Debug, Default)]
pub struct RenameDetector {
    options: RenameOptions,
}

impl RenameDetector {
    pub fn new(options: RenameOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenameOptions {
        &self.options
    }

    /// Detect renames between the top-level keys of two trees.
    pub fn detect(&self, original: &Tree, updated: &Tree) -> RenameMap {
        let keys = partition_keys(original, updated);
        let mut renames = RenameMap::new();
        if keys.deleted.is_empty() || keys.added.is_empty() {
            return renames;
        }

        let mut buckets: HashMap<Fingerprint, Vec<&str>> = HashMap::new();
        for &key in &keys.added {
            if let Some(node) = updated.get(key) {
                buckets.entry(Fingerprint::of(node)).or_default().push(key);
            }
        }

        let mut claimed: HashSet<&str> = HashSet::new();
        for &old in &keys.deleted {
            let Some(old_node) = original.get(old) else {
                continue;
            };
            let Some(candidates) = buckets.get(&Fingerprint::of(old_node)) else {
                continue;
            };

            let found = candidates.iter().copied().find(|&new| {
                if self.options.exclusive_targets && claimed.contains(new) {
                    return false;
                }
                if !self.names_similar(old, new) {
                    return false;
                }
                updated
                    .get(new)
                    .is_some_and(|new_node| is_unchanged(old_node, new_node))
            });

            if let Some(new) = found {
                debug!(from = %old, to = %new, "rename detected");
                claimed.insert(new);
                renames.insert(old, new);
            }
        }

        renames
    }

    fn names_similar(&self, old: &str, new: &str) -> bool {
        match self.options.min_name_similarity {
            Some(min) => name_similarity(old, new) >= min,
            None => true,
        }
    }
}

/// Detect renames with the default policy.
pub fn detect_renames(original: &Tree, updated: &Tree) -> RenameMap {
    RenameDetector::default().detect(original, updated)
}

/// Character-level similarity ratio of two key names, in `0.0..=1.0`.
pub fn name_similarity(a: &str, b: &str) -> f32 {
    similar::TextDiff::from_chars(a, b).ratio()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> Tree {
        Tree::from_json(&value).unwrap()
    }

    #[test]
    fn legacy_suffix_rename() {
        let original = tree(json!({"swatch-border-opacity-legacy": {"value": "0.2"}}));
        let updated = tree(json!({"swatch-border-opacity": {"value": "0.2"}}));

        let renames = detect_renames(&original, &updated);
        assert_eq!(renames.len(), 1);
        assert_eq!(
            renames.get("swatch-border-opacity-legacy"),
            Some("swatch-border-opacity")
        );
    }

    #[test]
    fn rename_requires_full_structural_equality() {
        let original = tree(json!({
            "old": {"sets": {"light": {"value": "#fff"}, "dark": {"value": "#000"}}}
        }));
        let updated = tree(json!({
            "new": {"sets": {"light": {"value": "#fff"}, "dark": {"value": "#111"}}}
        }));

        assert!(detect_renames(&original, &updated).is_empty());
    }

    #[test]
    fn key_order_inside_definition_is_ignored() {
        let original = tree(json!({"old": {"value": "0", "uuid": "u-1"}}));
        let updated = tree(json!({"new": {"uuid": "u-1", "value": "0"}}));

        assert_eq!(detect_renames(&original, &updated).get("old"), Some("new"));
    }

    #[test]
    fn first_match_wins_and_targets_are_exclusive() {
        let original = tree(json!({"d1": {"value": "0"}, "d2": {"value": "0"}}));
        let updated = tree(json!({"a1": {"value": "0"}, "a2": {"value": "0"}}));

        let renames = detect_renames(&original, &updated);
        assert_eq!(renames.get("d1"), Some("a1"));
        assert_eq!(renames.get("d2"), Some("a2"));
    }

    #[test]
    fn shared_targets_when_not_exclusive() {
        let original = tree(json!({"d1": {"value": "0"}, "d2": {"value": "0"}}));
        let updated = tree(json!({"a1": {"value": "0"}}));

        let exclusive = detect_renames(&original, &updated);
        assert_eq!(exclusive.len(), 1);

        let detector = RenameDetector::new(RenameOptions {
            exclusive_targets: false,
            ..RenameOptions::default()
        });
        let shared = detector.detect(&original, &updated);
        assert_eq!(shared.get("d1"), Some("a1"));
        assert_eq!(shared.get("d2"), Some("a1"));
        assert_eq!(shared.source_for("a1"), Some("d1"));
    }

    #[test]
    fn name_similarity_filters_coincidental_duplicates() {
        let original = tree(json!({"gray-100": {"value": "0"}, "spacing-legacy": {"value": "0"}}));
        let updated = tree(json!({"spacing": {"value": "0"}}));

        let detector = RenameDetector::new(RenameOptions {
            min_name_similarity: Some(0.6),
            ..RenameOptions::default()
        });
        let renames = detector.detect(&original, &updated);
        assert_eq!(renames.len(), 1);
        assert_eq!(renames.get("spacing-legacy"), Some("spacing"));
        assert!(!renames.contains_source("gray-100"));
    }

    #[test]
    fn common_keys_are_never_renamed() {
        let original = tree(json!({"a": {"value": "1"}}));
        let updated = tree(json!({"a": {"value": "1"}, "b": {"value": "1"}}));
        assert!(detect_renames(&original, &updated).is_empty());
    }

    #[test]
    fn similarity_bounds() {
        assert_eq!(name_similarity("abc", "abc"), 1.0);
        assert_eq!(name_similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn rename_map_serializes_as_object() {
        let renames: RenameMap = [("old", "new")].into_iter().collect();
        assert_eq!(serde_json::to_value(&renames).unwrap(), json!({"old": "new"}));
        assert!(renames.contains_target("new"));
    }
}
