//! Pipeline module.
//!
//! This module provides the data preparation pipeline and its progress reporting.

mod builder;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder, PreparedDataset, count_missing_cells};
pub use progress::{ClosureProgressReporter, PreprocessingStage, ProgressReporter, ProgressUpdate};
