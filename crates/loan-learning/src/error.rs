//! Error types for the loan-learning crate.
//!
//! This module defines [`LearningError`], the main error type used throughout
//! the crate. All public API functions return `Result<T, LearningError>`.
//!
//! # Example
//!
//! ```rust,ignore
//! use loan_learning::{LearningError, TrainingConfig};
//!
//! fn configure() -> Result<TrainingConfig, LearningError> {
//!     // Errors are automatically propagated with ?
//!     let config = TrainingConfig::builder()
//!         .label_column("status")
//!         .max_iterations(200)
//!         .build()?;
//!     Ok(config)
//! }
//! ```

use thiserror::Error;

/// The main error type for loan-learning operations.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// without breaking downstream code.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LearningError {
    /// Invalid configuration provided to the trainer.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid data provided for training, evaluation or inference.
    ///
    /// Common causes:
    /// - The table contains missing values (run the preparation pipeline first)
    /// - The table is empty
    /// - A feature column has a kind the feature pipeline cannot encode
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The label column was not found in the table.
    #[error("Label column '{0}' not found")]
    LabelNotFound(String),

    /// The optimizer or the feature transform failed while fitting.
    #[error("Training failed: {0}")]
    TrainingFailed(String),

    /// The model artifact could not be written.
    #[error("Failed to save model to '{path}': {source}")]
    SaveFailed {
        /// Destination path.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The specified model file was not found.
    #[error("Model not found: {path}")]
    ModelNotFound {
        /// The path that was not found.
        path: String,
    },

    /// An error occurred during inference/prediction.
    #[error("Inference error: {0}")]
    InferenceError(String),

    /// Input columns do not match the schema the model was trained on.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl LearningError {
    /// Get a stable error code for reports and exit diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidData(_) => "INVALID_DATA",
            Self::LabelNotFound(_) => "LABEL_NOT_FOUND",
            Self::TrainingFailed(_) => "TRAINING_FAILED",
            Self::SaveFailed { .. } => "SAVE_FAILED",
            Self::ModelNotFound { .. } => "MODEL_NOT_FOUND",
            Self::InferenceError(_) => "INFERENCE_ERROR",
            Self::SchemaMismatch(_) => "SCHEMA_MISMATCH",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
        }
    }
}

/// Result type alias for learning operations.
pub type Result<T> = std::result::Result<T, LearningError>;
