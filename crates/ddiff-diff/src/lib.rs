//! Diff engine for design data.
//!
//! Compares two normalized snapshots and partitions every change into added,
//! deleted, and updated trees at each nested level. Renames are inferred from
//! structurally identical deleted/added pairs, and the deleted set is then
//! filtered down to true removals.
//!
//! # Key Types
//!
//! - [`DetailedDiff`] / [`NodeDiff`] -- Recursive added/deleted/updated partition
//! - [`ChangeRecord`] / [`ChangeKind`] -- Flattened path-addressed changes
//! - [`RenameDetector`] / [`RenameMap`] / [`RenameOptions`] -- Structural rename matching
//! - [`Deprecation`] -- Deprecation marker read by the deletion reclassifier

pub mod changes;
pub mod error;
pub mod reclassify;
pub mod rename;
pub mod tree_diff;

pub use changes::{collect_changes, ChangeKind, ChangeRecord};
pub use error::{DiffError, DiffResult, Side};
pub use reclassify::{
    deprecation, reclassify_deletions, Deprecation, DEPRECATED_COMMENT_KEY,
    DEPRECATED_KEY,
};
pub use rename::{detect_renames, name_similarity, RenameDetector, RenameMap, RenameOptions};
pub use tree_diff::{
    added_diff, combined_diff, deleted_diff, diff_nodes, diff_trees, diff_values, is_unchanged,
    partition_keys, updated_diff, DetailedDiff, KeyPartition, NodeDiff,
};
