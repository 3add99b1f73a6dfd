//! Configuration types for training the loan approval classifier.
//!
//! This module provides [`TrainingConfig`] and its builder.
//!
//! # Example
//!
//! ```rust,ignore
//! use loan_learning::TrainingConfig;
//!
//! let config = TrainingConfig::builder()
//!     .label_column("status")
//!     .max_iterations(200)
//!     .alpha(0.5)
//!     .build()
//!     .expect("valid config");
//! ```

use crate::error::LearningError;
use serde::{Deserialize, Serialize};

/// Configuration for the logistic regression trainer.
///
/// Use [`TrainingConfig::builder()`] to construct a configuration with the builder pattern.
///
/// # Validation
///
/// The builder validates the following constraints on [`build()`](TrainingConfigBuilder::build):
/// - `label_column` must not be empty
/// - `max_iterations` must be at least 1
/// - `gradient_tolerance` must be finite and positive
/// - `alpha` must be finite and non-negative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Name of the boolean label column (default: "status").
    pub label_column: String,

    /// Maximum number of LBFGS iterations (default: 100).
    pub max_iterations: u64,

    /// Gradient norm below which the optimizer stops (default: 1e-4).
    pub gradient_tolerance: f64,

    /// L2 regularization strength (default: 1.0).
    ///
    /// `0.0` disables regularization.
    pub alpha: f64,

    /// Whether to fit an intercept term (default: true).
    pub with_intercept: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            label_column: "status".to_string(),
            max_iterations: 100,
            gradient_tolerance: 1e-4,
            alpha: 1.0,
            with_intercept: true,
        }
    }
}

impl TrainingConfig {
    /// Create a new builder for `TrainingConfig`.
    #[must_use]
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::default()
    }

    /// Check the constraints listed on the type.
    pub fn validate(&self) -> Result<(), LearningError> {
        if self.label_column.trim().is_empty() {
            return Err(LearningError::InvalidConfig(
                "label_column must not be empty".to_string(),
            ));
        }

        if self.max_iterations == 0 {
            return Err(LearningError::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }

        if !(self.gradient_tolerance.is_finite() && self.gradient_tolerance > 0.0) {
            return Err(LearningError::InvalidConfig(
                "gradient_tolerance must be a positive number".to_string(),
            ));
        }

        if !(self.alpha.is_finite() && self.alpha >= 0.0) {
            return Err(LearningError::InvalidConfig(
                "alpha must be a non-negative number".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`TrainingConfig`].
///
/// Created via [`TrainingConfig::builder()`]. All setters return `self` to allow
/// method chaining.
#[derive(Debug, Clone, Default)]
pub struct TrainingConfigBuilder {
    config: TrainingConfig,
}

impl TrainingConfigBuilder {
    /// Set the label column name.
    #[must_use]
    pub fn label_column(mut self, column: impl Into<String>) -> Self {
        self.config.label_column = column.into();
        self
    }

    /// Set the maximum number of optimizer iterations (default: 100).
    #[must_use]
    pub fn max_iterations(mut self, iterations: u64) -> Self {
        self.config.max_iterations = iterations;
        self
    }

    /// Set the gradient tolerance (default: 1e-4).
    #[must_use]
    pub fn gradient_tolerance(mut self, tolerance: f64) -> Self {
        self.config.gradient_tolerance = tolerance;
        self
    }

    /// Set the L2 regularization strength (default: 1.0).
    #[must_use]
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.config.alpha = alpha;
        self
    }

    /// Enable or disable the intercept term (default: true).
    #[must_use]
    pub fn with_intercept(mut self, with_intercept: bool) -> Self {
        self.config.with_intercept = with_intercept;
        self
    }

    /// Build the configuration, validating all settings.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::InvalidConfig`] if any constraint is violated.
    pub fn build(self) -> Result<TrainingConfig, LearningError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrainingConfig::default();
        assert_eq!(config.label_column, "status");
        assert_eq!(config.max_iterations, 100);
        assert_eq!(config.gradient_tolerance, 1e-4);
        assert_eq!(config.alpha, 1.0);
        assert!(config.with_intercept);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_sets_values() {
        let config = TrainingConfig::builder()
            .label_column("approved")
            .max_iterations(250)
            .gradient_tolerance(1e-6)
            .alpha(0.0)
            .with_intercept(false)
            .build()
            .unwrap();

        assert_eq!(config.label_column, "approved");
        assert_eq!(config.max_iterations, 250);
        assert_eq!(config.alpha, 0.0);
        assert!(!config.with_intercept);
    }

    #[test]
    fn test_builder_rejects_invalid_values() {
        assert!(TrainingConfig::builder().max_iterations(0).build().is_err());
        assert!(TrainingConfig::builder().gradient_tolerance(0.0).build().is_err());
        assert!(TrainingConfig::builder().alpha(-1.0).build().is_err());
        assert!(TrainingConfig::builder().alpha(f64::NAN).build().is_err());
        assert!(TrainingConfig::builder().label_column("  ").build().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TrainingConfig = serde_json::from_str(r#"{"max_iterations": 50}"#).unwrap();
        assert_eq!(config.max_iterations, 50);
        assert_eq!(config.alpha, 1.0);
    }
}
