//! Batch errors and per-file failures.

use std::fmt;

use ddiff_diff::{DiffError, Side};
use serde::Serialize;

/// A file pair that could not be compared.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PartialFailure {
    /// Name of the file pair.
    pub path: String,
    /// Which snapshot failed to decode or normalize.
    pub side: Side,
    pub reason: String,
}

impl PartialFailure {
    pub fn new(path: impl Into<String>, error: DiffError) -> Self {
        match error {
            DiffError::Malformed { side, source } => Self {
                path: path.into(),
                side,
                reason: source.to_string(),
            },
        }
    }

    /// A side whose file could not be decoded as JSON.
    pub fn undecodable(path: impl Into<String>, side: Side, reason: impl fmt::Display) -> Self {
        Self {
            path: path.into(),
            side,
            reason: format!("invalid JSON: {reason}"),
        }
    }
}

impl fmt::Display for PartialFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.path, self.side, self.reason)
    }
}

/// Errors that abort a batch.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// Strict mode is on and at least one file pair failed.
    #[error("{} file comparison(s) failed in strict mode", .failures.len())]
    Strict { failures: Vec<PartialFailure> },

    /// Configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for BatchError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
