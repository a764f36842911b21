//! Batch configuration, loadable from TOML.

use ddiff_diff::RenameOptions;
use ddiff_types::{Normalizer, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};

use crate::error::BatchError;

/// Configuration for a batch comparison.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Fail the whole batch when any file pair fails.
    pub strict: bool,
    /// Evaluate file pairs on a thread pool. Only honoured when the crate is
    /// built with the `parallel` feature.
    pub parallel: bool,
    /// Maximum nesting depth accepted when normalizing a snapshot.
    pub max_depth: usize,
    /// Rename matching policy for token comparisons.
    pub rename: RenameOptions,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            strict: false,
            parallel: true,
            max_depth: DEFAULT_MAX_DEPTH,
            rename: RenameOptions::default(),
        }
    }
}

impl BatchConfig {
    /// A configuration where any failed file pair fails the batch.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Default::default()
        }
    }

    /// Parse a TOML document. Missing keys take their default values.
    pub fn from_toml_str(input: &str) -> Result<Self, BatchError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BatchError> {
        if self.max_depth == 0 {
            return Err(BatchError::Config("max_depth must be at least 1".into()));
        }
        if let Some(min) = self.rename.min_name_similarity {
            if !(0.0..=1.0).contains(&min) {
                return Err(BatchError::Config(format!(
                    "rename.min_name_similarity must be within 0.0..=1.0, got {min}"
                )));
            }
        }
        Ok(())
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.max_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BatchConfig::default();
        assert!(!config.strict);
        assert!(config.parallel);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.rename.exclusive_targets);
        assert!(BatchConfig::strict().strict);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(BatchConfig::from_toml_str("").unwrap(), BatchConfig::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let config = BatchConfig::from_toml_str(
            r#"
            strict = true
            max_depth = 16

            [rename]
            min_name_similarity = 0.5
            "#,
        )
        .unwrap();
        assert!(config.strict);
        assert!(config.parallel);
        assert_eq!(config.max_depth, 16);
        assert_eq!(config.rename.min_name_similarity, Some(0.5));
        assert!(config.rename.exclusive_targets);
        assert_eq!(config.normalizer().max_depth(), 16);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let err = BatchConfig::from_toml_str("max_depth = 0").unwrap_err();
        assert!(matches!(err, BatchError::Config(_)));

        let err = BatchConfig::from_toml_str("[rename]\nmin_name_similarity = 2.0").unwrap_err();
        assert!(err.to_string().contains("min_name_similarity"));

        let err = BatchConfig::from_toml_str("strict = \"yes\"").unwrap_err();
        assert!(err.to_string().starts_with("configuration error"));
    }
}
