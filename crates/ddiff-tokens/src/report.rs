//! Token change report types.

use ddiff_diff::{ChangeKind, ChangeRecord};
use ddiff_types::{Node, Tree, TreePath};
use indexmap::IndexMap;
use serde::Serialize;

/// The previous name of a renamed token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenamedToken {
    #[serde(rename = "old-name")]
    pub old_name: String,
}

/// A token that gained a deprecation marker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeprecatedToken {
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated_comment: Option<String>,
}

/// One property-level change inside a token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyChange {
    pub path: TreePath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_value: Option<Node>,
}

impl PropertyChange {
    /// Returns `true` when both sides are alias references to different tokens.
    pub fn is_alias_retarget(&self) -> bool {
        let target = |node: &Option<Node>| {
            node.as_ref()
                .and_then(Node::as_scalar)
                .and_then(|s| s.alias())
                .map(|alias| alias.target().to_owned())
        };
        match (target(&self.original_value), target(&self.new_value)) {
            (Some(before), Some(after)) => before != after,
            _ => false,
        }
    }
}

impl From<ChangeRecord> for PropertyChange {
    fn from(record: ChangeRecord) -> Self {
        Self {
            path: record.path,
            new_value: record.new_value,
            original_value: record.original_value,
        }
    }
}

/// The property changes of a single token.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TokenChanges {
    pub changes: Vec<PropertyChange>,
}

impl TokenChanges {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

/// Per-token property changes for tokens present in both snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UpdatedTokens {
    pub added: IndexMap<String, TokenChanges>,
    pub deleted: IndexMap<String, TokenChanges>,
    pub renamed: IndexMap<String, TokenChanges>,
    pub updated: IndexMap<String, TokenChanges>,
}

impl UpdatedTokens {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.deleted.is_empty()
            && self.renamed.is_empty()
            && self.updated.is_empty()
    }

    /// Number of distinct tokens with at least one property change.
    pub fn token_count(&self) -> usize {
        let mut names: Vec<&str> = self
            .buckets()
            .flat_map(|bucket| bucket.keys().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.dedup();
        names.len()
    }

    /// Total number of property changes across all buckets.
    pub fn change_count(&self) -> usize {
        self.buckets()
            .flat_map(|bucket| bucket.values())
            .map(TokenChanges::len)
            .sum()
    }

    pub(crate) fn push(&mut self, token: &str, kind: ChangeKind, change: PropertyChange) {
        let bucket = match kind {
            ChangeKind::Added => &mut self.added,
            ChangeKind::Deleted => &mut self.deleted,
            ChangeKind::Updated => &mut self.updated,
        };
        bucket.entry(token.to_owned()).or_default().changes.push(change);
    }

    pub(crate) fn push_renamed(&mut self, token: &str, change: PropertyChange) {
        self.renamed
            .entry(token.to_owned())
            .or_default()
            .changes
            .push(change);
    }

    fn buckets(&self) -> impl Iterator<Item = &IndexMap<String, TokenChanges>> {
        [&self.added, &self.deleted, &self.renamed, &self.updated].into_iter()
    }
}

/// The complete token change report between two snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TokenDiffReport {
    /// New name to previous name.
    pub renamed: IndexMap<String, RenamedToken>,
    pub deprecated: IndexMap<String, DeprecatedToken>,
    /// Tokens that lost their deprecation marker, with their current definition.
    pub reverted: Tree,
    pub added: Tree,
    pub deleted: Tree,
    pub updated: UpdatedTokens,
}

impl TokenDiffReport {
    pub fn is_empty(&self) -> bool {
        self.total_changes() == 0
    }

    /// Number of tokens touched, counting each report section separately.
    pub fn total_changes(&self) -> usize {
        self.renamed.len()
            + self.deprecated.len()
            + self.reverted.len()
            + self.added.len()
            + self.deleted.len()
            + self.updated.token_count()
    }

    /// Number of updated values that retarget one alias reference to another.
    pub fn alias_retargets(&self) -> usize {
        self.updated
            .updated
            .values()
            .flat_map(|token| &token.changes)
            .filter(|change| change.is_alias_retarget())
            .count()
    }

    pub fn summary(&self) -> TokenSummary {
        TokenSummary {
            renamed: self.renamed.len(),
            deprecated: self.deprecated.len(),
            reverted: self.reverted.len(),
            added: self.added.len(),
            deleted: self.deleted.len(),
            updated: self.updated.token_count(),
            alias_retargets: self.alias_retargets(),
        }
    }

    /// Fold another report into this one. Entries from `other` win on name
    /// collisions.
    pub fn merge(&mut self, other: TokenDiffReport) {
        self.renamed.extend(other.renamed);
        self.deprecated.extend(other.deprecated);
        merge_tree(&mut self.reverted, other.reverted);
        merge_tree(&mut self.added, other.added);
        merge_tree(&mut self.deleted, other.deleted);
        self.updated.added.extend(other.updated.added);
        self.updated.deleted.extend(other.updated.deleted);
        self.updated.renamed.extend(other.updated.renamed);
        self.updated.updated.extend(other.updated.updated);
    }
}

/// Per-section token counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSummary {
    pub renamed: usize,
    pub deprecated: usize,
    pub reverted: usize,
    pub added: usize,
    pub deleted: usize,
    pub updated: usize,
    pub alias_retargets: usize,
}

fn merge_tree(target: &mut Tree, source: Tree) {
    for (key, node) in source {
        target.insert(key, node);
    }
}
