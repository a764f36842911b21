//! Error types for the diff crate.

use std::fmt;

use ddiff_types::MalformedTreeError;
use serde::{Deserialize, Serialize};

/// Which of the two compared snapshots an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Original,
    Updated,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Original => f.write_str("original"),
            Side::Updated => f.write_str("updated"),
        }
    }
}

/// Errors that can occur during diff operations.
///
/// The diff itself cannot fail once both inputs are trees; the only failure
/// is an input that does not normalize.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    #[error("{side} snapshot is malformed: {source}")]
    Malformed {
        side: Side,
        #[source]
        source: MalformedTreeError,
    },
}

impl DiffError {
    pub fn malformed(side: Side, source: MalformedTreeError) -> Self {
        Self::Malformed { side, source }
    }
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
