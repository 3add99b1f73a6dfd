//! Custom error types for the data preparation pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Every failure
//! in the pipeline is fatal for the run; the variants only differ in what they
//! tell the operator to fix.
//!
//! Errors are serializable so a run report can carry them as `{code, message}`.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the data preparation pipeline.
#[derive(Error, Debug)]
pub enum PreprocessingError {
    /// The source file could not be opened or parsed.
    #[error("Failed to load dataset from '{path}': {reason}")]
    LoadFailed { path: String, reason: String },

    /// The label column is missing from the allow-list or from the loaded table.
    #[error("Label column '{0}' not found")]
    LabelNotFound(String),

    /// Two columns map to the same name once lowercased.
    #[error("Column name '{0}' is ambiguous after lowercasing")]
    DuplicateColumn(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No valid values found in a column for computation.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// Imputation failed.
    #[error("Failed to impute missing values in column '{column}': {reason}")]
    ImputationFailed { column: String, reason: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PreprocessingError>,
    },
}

impl PreprocessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PreprocessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for reports and exit diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::LoadFailed { .. } => "LOAD_FAILED",
            Self::LabelNotFound(_) => "LABEL_NOT_FOUND",
            Self::DuplicateColumn(_) => "DUPLICATE_COLUMN",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::NoValidValues(_) => "EMPTY_COLUMN",
            Self::ImputationFailed { .. } => "IMPUTATION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error was caused by the run configuration rather than the data.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Self::InvalidConfig(_) | Self::LabelNotFound(_) | Self::DuplicateColumn(_) => true,
            Self::WithContext { source, .. } => source.is_configuration_error(),
            _ => false,
        }
    }
}

impl From<crate::config::ConfigValidationError> for PreprocessingError {
    fn from(err: crate::config::ConfigValidationError) -> Self {
        PreprocessingError::InvalidConfig(err.to_string())
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for PreprocessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PreprocessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for preprocessing operations.
pub type Result<T> = std::result::Result<T, PreprocessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PreprocessingError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            PreprocessingError::NoValidValues("income".to_string()).error_code(),
            "EMPTY_COLUMN"
        );
        assert_eq!(
            PreprocessingError::LabelNotFound("status".to_string()).error_code(),
            "LABEL_NOT_FOUND"
        );
        assert_eq!(
            PreprocessingError::DuplicateColumn("age".to_string()).error_code(),
            "DUPLICATE_COLUMN"
        );
    }

    #[test]
    fn test_is_configuration_error() {
        assert!(PreprocessingError::LabelNotFound("status".to_string()).is_configuration_error());
        assert!(PreprocessingError::DuplicateColumn("age".to_string()).is_configuration_error());
        assert!(
            !PreprocessingError::NoValidValues("income".to_string()).is_configuration_error()
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = PreprocessingError::LabelNotFound("status".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("LABEL_NOT_FOUND"));
        assert!(json.contains("status"));
    }

    #[test]
    fn test_with_context() {
        let error = PreprocessingError::LabelNotFound("status".to_string())
            .with_context("During schema normalization");
        assert!(error.to_string().contains("During schema normalization"));
        assert_eq!(error.error_code(), "LABEL_NOT_FOUND");
        assert!(error.is_configuration_error());
    }
}
