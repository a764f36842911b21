//! Errors raised while normalizing decoded input into the tree model.

use thiserror::Error;

use crate::path::TreePath;

/// A snapshot could not be normalized into the Scalar/Tree/List model.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("malformed tree at {path}: {reason}")]
pub struct MalformedTreeError {
    /// Where in the snapshot normalization failed.
    pub path: TreePath,
    /// Why it failed.
    pub reason: MalformedReason,
}

impl MalformedTreeError {
    pub fn new(path: TreePath, reason: MalformedReason) -> Self {
        Self { path, reason }
    }
}

/// The specific normalization failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MalformedReason {
    #[error("expected an object at the snapshot root, found {found}")]
    RootNotObject { found: &'static str },

    #[error("nesting exceeds the maximum depth of {limit}")]
    DepthExceeded { limit: usize },
}
