//! The per-file comparison seam used by [`BatchRunner`](crate::BatchRunner).

use ddiff_schemas::{compare_components, ComponentDiffReport};
use ddiff_tokens::{compare_tokens, TokenDiffOptions, TokenDiffReport};
use ddiff_types::Tree;

/// A report that can be folded together with others of its kind.
pub trait MergeReport: Default {
    fn merge_from(&mut self, other: Self);
}

impl MergeReport for TokenDiffReport {
    fn merge_from(&mut self, other: Self) {
        self.merge(other);
    }
}

impl MergeReport for ComponentDiffReport {
    fn merge_from(&mut self, other: Self) {
        self.merge(other);
    }
}

/// Compares one pair of normalized snapshots.
pub trait Comparison: Send + Sync {
    type Output: MergeReport + Send;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn compare(&self, original: &Tree, updated: &Tree) -> Self::Output;
}

/// Design token comparison.
#[derive(Clone, Debug, Default)]
pub struct TokenComparison {
    options: TokenDiffOptions,
}

impl TokenComparison {
    pub fn new(options: TokenDiffOptions) -> Self {
        Self { options }
    }
}

impl Comparison for TokenComparison {
    type Output = TokenDiffReport;

    fn name(&self) -> &'static str {
        "tokens"
    }

    fn compare(&self, original: &Tree, updated: &Tree) -> TokenDiffReport {
        compare_tokens(original, updated, &self.options)
    }
}

/// Component schema comparison with breaking-change classification.
#[derive(Clone, Copy, Debug, Default)]
pub struct SchemaComparison;

impl Comparison for SchemaComparison {
    type Output = ComponentDiffReport;

    fn name(&self) -> &'static str {
        "components"
    }

    fn compare(&self, original: &Tree, updated: &Tree) -> ComponentDiffReport {
        compare_components(original, updated)
    }
}
