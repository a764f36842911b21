//! Breaking-change classification of component schema diffs.
//!
//! Each component touched by the diff is examined against its original and
//! updated schema. Property-level rules cover additions, removals, type and
//! `$ref` changes, enum narrowing and widening, and `required` list changes.
//! Title, description, and `meta.*` edits are metadata. Everything else is
//! classified as [`ChangeReason::Other`], which is non-breaking.

use std::collections::HashSet;

use ddiff_diff::{collect_changes, diff_nodes, diff_trees, DetailedDiff, NodeDiff};
use ddiff_types::{Node, Tree};
use tracing::debug;

use crate::report::{
    ChangeReason, ClassifiedChange, ComponentChangeSet, ComponentChanges, ComponentDiffReport,
};

const PROPERTIES: &str = "properties";
const REQUIRED: &str = "required";
const METADATA_KEYS: [&str; 3] = ["title", "description", "meta"];
const TYPE_KEYS: [&str; 2] = ["type", "$ref"];
const ENUM: &str = "enum";
const DESCRIPTION: &str = "description";

/// Diff two component schema sets and classify the result.
pub fn compare_components(original: &Tree, updated: &Tree) -> ComponentDiffReport {
    let diff = diff_trees(original, updated);
    classify(&diff, original, updated)
}

/// Classify a component diff against the snapshots it was computed from.
pub fn classify(diff: &DetailedDiff, original: &Tree, updated: &Tree) -> ComponentDiffReport {
    let mut changes = ComponentChanges::default();

    for (name, schema) in diff.added.iter() {
        if original.contains_key(name) {
            continue;
        }
        changes.added.insert(
            name.to_owned(),
            ComponentChangeSet {
                schema: Some(schema.clone()),
                changes: vec![ClassifiedChange::new(name, ChangeReason::ComponentAdded)],
            },
        );
    }

    for (name, schema) in original.iter() {
        if updated.contains_key(name) || !diff.deleted.contains_key(name) {
            continue;
        }
        changes.deleted.insert(
            name.to_owned(),
            ComponentChangeSet {
                schema: Some(schema.clone()),
                changes: vec![ClassifiedChange::new(name, ChangeReason::ComponentRemoved)],
            },
        );
    }

    for (name, after) in updated.iter() {
        let Some(before) = original.get(name) else {
            continue;
        };
        let touched = [&diff.added, &diff.deleted, &diff.updated]
            .iter()
            .any(|part| part.contains_key(name));
        if !touched {
            continue;
        }

        let classified = classify_component(name, before, after);
        if classified.is_empty() {
            continue;
        }
        let set = ComponentChangeSet {
            schema: None,
            changes: classified,
        };
        debug!(
            component = %name,
            breaking = set.breaking_count(),
            non_breaking = set.non_breaking_count(),
            "component classified"
        );
        if set.has_breaking() {
            changes.updated.breaking.insert(name.to_owned(), set);
        } else {
            changes.updated.non_breaking.insert(name.to_owned(), set);
        }
    }

    ComponentDiffReport::from_changes(changes)
}

fn classify_component(name: &str, before: &Node, after: &Node) -> Vec<ClassifiedChange> {
    let diff = match diff_nodes(before, after) {
        NodeDiff::Unchanged => return Vec::new(),
        NodeDiff::Replaced(_) => {
            return vec![ClassifiedChange::new(name, ChangeReason::Other).with_detail("schema replaced")]
        }
        NodeDiff::Nested(diff) => diff,
    };
    let (Some(before), Some(after)) = (before.as_tree(), after.as_tree()) else {
        return vec![ClassifiedChange::new(name, ChangeReason::Other)];
    };

    let mut out = Vec::new();
    classify_properties(name, before, after, &mut out);
    classify_remaining(name, &diff, before, after, &mut out);
    out
}

fn classify_properties(name: &str, before: &Tree, after: &Tree, out: &mut Vec<ClassifiedChange>) {
    let empty = Tree::new();
    let old_props = before.get_tree(PROPERTIES).unwrap_or(&empty);
    let new_props = after.get_tree(PROPERTIES).unwrap_or(&empty);
    let old_required = required_names(before);
    let new_required = required_names(after);

    for (prop, old_def) in old_props.iter() {
        match new_props.get(prop) {
            None => out.push(ClassifiedChange::new(name, ChangeReason::PropertyRemoved).with_property(prop)),
            Some(new_def) => classify_property(name, prop, old_def, new_def, out),
        }
    }

    for prop in new_props.keys() {
        if old_props.contains_key(prop) {
            continue;
        }
        let reason = if new_required.contains(&prop) {
            ChangeReason::RequiredPropertyAdded
        } else {
            ChangeReason::PropertyAdded
        };
        out.push(ClassifiedChange::new(name, reason).with_property(prop));
    }

    // Required-list changes for properties not already reported as added or removed.
    for prop in &new_required {
        if !old_required.contains(prop) && old_props.contains_key(prop) && new_props.contains_key(prop) {
            out.push(ClassifiedChange::new(name, ChangeReason::RequiredPropertyAdded).with_property(*prop));
        } else if !old_required.contains(prop) && !new_props.contains_key(prop) {
            out.push(
                ClassifiedChange::new(name, ChangeReason::RequiredPropertyAdded)
                    .with_property(*prop)
                    .with_detail("not declared in properties"),
            );
        }
    }
    for prop in &old_required {
        if !new_required.contains(prop) && new_props.contains_key(prop) {
            out.push(ClassifiedChange::new(name, ChangeReason::RequiredPropertyRemoved).with_property(*prop));
        }
    }
}

fn classify_property(name: &str, prop: &str, before: &Node, after: &Node, out: &mut Vec<ClassifiedChange>) {
    if diff_nodes(before, after).is_empty() {
        return;
    }
    let (Some(before), Some(after)) = (before.as_tree(), after.as_tree()) else {
        out.push(ClassifiedChange::new(name, ChangeReason::Other).with_property(prop));
        return;
    };

    // `type` and `$ref` changing together is one retyping.
    let retyped: Vec<String> = TYPE_KEYS
        .iter()
        .filter_map(|key| {
            let (old, new) = (before.get(key), after.get(key));
            (!same(old, new)).then(|| format!("{key}: {} -> {}", render(old), render(new)))
        })
        .collect();
    if !retyped.is_empty() {
        out.push(
            ClassifiedChange::new(name, ChangeReason::PropertyTypeChanged)
                .with_property(prop)
                .with_detail(retyped.join("; ")),
        );
    }

    match (
        before.get(ENUM).and_then(Node::as_list),
        after.get(ENUM).and_then(Node::as_list),
    ) {
        (Some(old_values), Some(new_values)) => {
            let removed: Vec<&Node> = old_values.iter().filter(|v| !new_values.contains(v)).collect();
            let added: Vec<&Node> = new_values.iter().filter(|v| !old_values.contains(v)).collect();
            if !removed.is_empty() {
                out.push(
                    ClassifiedChange::new(name, ChangeReason::EnumValuesRemoved)
                        .with_property(prop)
                        .with_detail(render_list(&removed)),
                );
            }
            if !added.is_empty() {
                out.push(
                    ClassifiedChange::new(name, ChangeReason::EnumValuesAdded)
                        .with_property(prop)
                        .with_detail(render_list(&added)),
                );
            }
        }
        // A new enum narrows the accepted values; dropping one widens them.
        (None, Some(_)) => {
            out.push(
                ClassifiedChange::new(name, ChangeReason::EnumValuesRemoved)
                    .with_property(prop)
                    .with_detail("enum introduced"),
            );
        }
        (Some(_), None) => {
            out.push(
                ClassifiedChange::new(name, ChangeReason::Other)
                    .with_property(prop)
                    .with_detail("enum removed"),
            );
        }
        _ => {}
    }

    if !same(before.get(DESCRIPTION), after.get(DESCRIPTION)) {
        out.push(
            ClassifiedChange::new(name, ChangeReason::MetadataChanged)
                .with_property(prop)
                .with_detail(DESCRIPTION),
        );
    }

    let handled = |key: &str| TYPE_KEYS.contains(&key) || key == ENUM || key == DESCRIPTION;
    let mut other: Vec<&str> = Vec::new();
    for key in before.keys().chain(after.keys()) {
        if handled(key) || other.contains(&key) {
            continue;
        }
        if !same(before.get(key), after.get(key)) {
            other.push(key);
        }
    }
    for key in other {
        out.push(
            ClassifiedChange::new(name, ChangeReason::Other)
                .with_property(prop)
                .with_detail(key),
        );
    }
}

/// Metadata and unmatched top-level changes outside `properties` and `required`.
fn classify_remaining(
    name: &str,
    diff: &DetailedDiff,
    before: &Tree,
    after: &Tree,
    out: &mut Vec<ClassifiedChange>,
) {
    let mut other_keys: Vec<String> = Vec::new();
    for record in collect_changes(diff, before, after) {
        let Some(top) = record.path.first() else {
            continue;
        };
        if top == PROPERTIES || top == REQUIRED {
            continue;
        }
        if METADATA_KEYS.contains(&top) {
            out.push(
                ClassifiedChange::new(name, ChangeReason::MetadataChanged)
                    .with_detail(record.path.to_string()),
            );
        } else if !other_keys.iter().any(|k| k == top) {
            other_keys.push(top.to_owned());
        }
    }
    for key in other_keys {
        out.push(ClassifiedChange::new(name, ChangeReason::Other).with_detail(key));
    }
}

fn required_names(schema: &Tree) -> Vec<&str> {
    let mut seen = HashSet::new();
    schema
        .get(REQUIRED)
        .and_then(Node::as_list)
        .unwrap_or_default()
        .iter()
        .filter_map(Node::as_str)
        .filter(|name| seen.insert(*name))
        .collect()
}

fn same(a: Option<&Node>, b: Option<&Node>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => diff_nodes(a, b).is_empty(),
        (None, None) => true,
        _ => false,
    }
}

fn render(node: Option<&Node>) -> String {
    node.map_or_else(|| "none".to_owned(), |n| n.to_json().to_string())
}

fn render_list(values: &[&Node]) -> String {
    values
        .iter()
        .map(|n| n.to_json().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
