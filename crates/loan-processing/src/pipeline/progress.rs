//! Progress reporting for the data preparation pipeline.
//!
//! The pipeline runs four stages in a fixed order and emits a
//! [`ProgressUpdate`] at each transition, plus one per column during
//! imputation.
//!
//! # Example
//!
//! ```rust,ignore
//! use loan_processing::Pipeline;
//!
//! let prepared = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:?}] {}", update.stage, update.message);
//!     })
//!     .build()?
//!     .process(df)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the data preparation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreprocessingStage {
    /// Validating the configuration and inspecting the input table
    Initializing,
    /// Lowercasing names, dropping columns, mapping the label
    SchemaNormalization,
    /// Filling missing values
    Imputation,
    /// Partitioning rows into train and test
    Splitting,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl PreprocessingStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Initializing => "Initializing",
            Self::SchemaNormalization => "Normalizing Schema",
            Self::Imputation => "Imputing Values",
            Self::Splitting => "Splitting Rows",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Returns the weight of this stage in the overall pipeline (0.0 - 1.0).
    ///
    /// The weights of the processing stages sum to 1.0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Initializing => 0.05,
            Self::SchemaNormalization => 0.25,
            Self::Imputation => 0.50,
            Self::Splitting => 0.20,
            Self::Complete => 0.0,
            Self::Failed => 0.0,
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Initializing => 0.0,
            Self::SchemaNormalization => 0.05,
            Self::Imputation => 0.30,
            Self::Splitting => 0.80,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// A single progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: PreprocessingStage,

    /// Optional sub-stage description (e.g., "Column: income")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_stage: Option<String>,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing current activity
    pub message: String,

    /// Number of items processed in current stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_processed: Option<usize>,

    /// Total items in current stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_total: Option<usize>,
}

impl ProgressUpdate {
    /// Creates a new progress update for a stage without sub-stage info.
    pub fn new(stage: PreprocessingStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            sub_stage: None,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
            items_processed: None,
            items_total: None,
        }
    }

    /// Creates a new progress update with item counts.
    pub fn with_items(
        stage: PreprocessingStage,
        sub_stage: impl Into<String>,
        current: usize,
        total: usize,
        message: impl Into<String>,
    ) -> Self {
        let stage_progress = if total > 0 {
            current as f32 / total as f32
        } else {
            0.0
        };
        let mut update = Self::new(stage, stage_progress, message);
        update.sub_stage = Some(sub_stage.into());
        update.items_processed = Some(current);
        update.items_total = Some(total);
        update
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(PreprocessingStage::Complete, 1.0, message)
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(PreprocessingStage::Failed, 0.0, message)
    }
}

/// Trait for receiving progress updates during preprocessing.
///
/// Implementations must be `Send + Sync` so a pipeline can be moved to a
/// worker thread together with its reporter.
pub trait ProgressReporter: Send + Sync {
    /// Called at each stage transition and once per imputed column.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
