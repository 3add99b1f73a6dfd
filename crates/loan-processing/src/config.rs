//! Configuration types for the data preparation pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup. Defaults describe the loan
//! approval dataset; every value can be overridden at run time.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Columns kept from the raw loan dataset. Everything else is dropped.
pub const DEFAULT_RELEVANT_COLUMNS: [&str; 12] = [
    "age",
    "region",
    "income",
    "credit_score",
    "loan_amount",
    "upfront_charges",
    "property_value",
    "dtir1", // debt to income ratio
    "ltv",   // loan amount to property value ratio
    "rate_of_interest",
    "term",
    "status",
];

/// Name of the label column.
pub const DEFAULT_LABEL_COLUMN: &str = "status";

/// Replacement for missing or empty categorical values.
pub const DEFAULT_MISSING_VALUE_REPLACEMENT: &str = "unknown";

/// Fraction of rows held out for evaluation.
pub const DEFAULT_TEST_FRACTION: f64 = 0.15;

/// Number of rows shown in dataset previews.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Configuration for the data preparation pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use loan_processing::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .label_column("status")
///     .test_fraction(0.2)
///     .seed(7)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Columns to keep, matched case-insensitively. Must include the label.
    pub relevant_columns: Vec<String>,

    /// Label column for prediction.
    /// Default: "status"
    pub label_column: String,

    /// Value written into missing or empty categorical cells.
    /// Default: "unknown"
    pub missing_value_replacement: String,

    /// Fraction of rows placed in the test split (exclusive 0.0 - 1.0).
    /// Default: 0.15
    pub test_fraction: f64,

    /// Seed for the train/test shuffle. `None` draws from OS entropy.
    pub seed: Option<u64>,

    /// Number of rows rendered in dataset previews.
    /// Default: 5
    pub preview_rows: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            relevant_columns: DEFAULT_RELEVANT_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            missing_value_replacement: DEFAULT_MISSING_VALUE_REPLACEMENT.to_string(),
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: None,
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Load a configuration from a JSON file and validate it.
    ///
    /// Fields absent from the file keep their default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// The allow-list in lowercase, in configured order.
    pub fn normalized_relevant_columns(&self) -> Vec<String> {
        self.relevant_columns
            .iter()
            .map(|c| c.to_lowercase())
            .collect()
    }

    /// The label column in lowercase.
    pub fn normalized_label_column(&self) -> String {
        self.label_column.to_lowercase()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ConfigValidationError::InvalidTestFraction(
                self.test_fraction,
            ));
        }

        if self.relevant_columns.is_empty() {
            return Err(ConfigValidationError::EmptyAllowList);
        }

        let label = self.normalized_label_column();
        if !self.normalized_relevant_columns().contains(&label) {
            return Err(ConfigValidationError::LabelNotInAllowList(
                self.label_column.clone(),
            ));
        }

        if self.missing_value_replacement.is_empty() {
            return Err(ConfigValidationError::EmptyMissingValueReplacement);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid test fraction: {0} (must be strictly between 0.0 and 1.0)")]
    InvalidTestFraction(f64),

    #[error("The list of relevant columns is empty")]
    EmptyAllowList,

    #[error("Label column '{0}' is not among the relevant columns")]
    LabelNotInAllowList(String),

    #[error("The missing value replacement must not be empty")]
    EmptyMissingValueReplacement,
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    relevant_columns: Option<Vec<String>>,
    label_column: Option<String>,
    missing_value_replacement: Option<String>,
    test_fraction: Option<f64>,
    seed: Option<u64>,
    preview_rows: Option<usize>,
}

impl PipelineConfigBuilder {
    /// Set the columns to keep. The label column must be one of them.
    pub fn relevant_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relevant_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the label column.
    pub fn label_column(mut self, column: impl Into<String>) -> Self {
        self.label_column = Some(column.into());
        self
    }

    /// Set the value used for missing categorical cells.
    pub fn missing_value_replacement(mut self, value: impl Into<String>) -> Self {
        self.missing_value_replacement = Some(value.into());
        self
    }

    /// Set the fraction of rows held out for testing.
    ///
    /// # Arguments
    /// * `fraction` - Value strictly between 0.0 and 1.0 (e.g., 0.15 = 15%)
    pub fn test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = Some(fraction);
        self
    }

    /// Fix the shuffle seed for a reproducible split.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of preview rows.
    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            relevant_columns: self.relevant_columns.unwrap_or(defaults.relevant_columns),
            label_column: self.label_column.unwrap_or(defaults.label_column),
            missing_value_replacement: self
                .missing_value_replacement
                .unwrap_or(defaults.missing_value_replacement),
            test_fraction: self.test_fraction.unwrap_or(defaults.test_fraction),
            seed: self.seed,
            preview_rows: self.preview_rows.unwrap_or(defaults.preview_rows),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.relevant_columns.len(), 12);
        assert_eq!(config.label_column, "status");
        assert_eq!(config.missing_value_replacement, "unknown");
        assert_eq!(config.test_fraction, 0.15);
        assert_eq!(config.preview_rows, 5);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .relevant_columns(["Age", "Income", "Approved"])
            .label_column("Approved")
            .missing_value_replacement("n/a")
            .test_fraction(0.3)
            .seed(42)
            .preview_rows(3)
            .build()
            .unwrap();

        assert_eq!(
            config.normalized_relevant_columns(),
            vec!["age", "income", "approved"]
        );
        assert_eq!(config.normalized_label_column(), "approved");
        assert_eq!(config.missing_value_replacement, "n/a");
        assert_eq!(config.test_fraction, 0.3);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.preview_rows, 3);
    }

    #[test]
    fn test_validation_invalid_test_fraction() {
        for fraction in [0.0, 1.0, -0.1, 1.5] {
            let result = PipelineConfig::builder().test_fraction(fraction).build();
            assert!(matches!(
                result.unwrap_err(),
                ConfigValidationError::InvalidTestFraction(_)
            ));
        }
    }

    #[test]
    fn test_validation_label_not_in_allow_list() {
        let result = PipelineConfig::builder()
            .relevant_columns(["age", "income"])
            .build();

        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::LabelNotInAllowList(_)
        ));
    }

    #[test]
    fn test_validation_label_match_is_case_insensitive() {
        let result = PipelineConfig::builder()
            .relevant_columns(["age", "STATUS"])
            .label_column("Status")
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_pipeline_config_from_json() {
        let json = r#"{
            "relevant_columns": ["age", "income", "status"],
            "test_fraction": 0.25,
            "seed": 11
        }"#;

        let config: PipelineConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.relevant_columns, vec!["age", "income", "status"]);
        assert_eq!(config.test_fraction, 0.25);
        assert_eq!(config.seed, Some(11));
        // Omitted fields fall back to defaults
        assert_eq!(config.label_column, "status");
        assert_eq!(config.missing_value_replacement, "unknown");
    }
}
