//! Loan Data Preparation Library
//!
//! Loads the loan approval dataset and prepares it for training with Polars.
//!
//! # Overview
//!
//! - **Loading**: CSV with header row, dtype inference, fallback parsing strategies
//! - **Schema Normalization**: lowercase names, column allow-list, boolean label
//! - **Imputation**: modal fill for numeric and boolean columns, sentinel fill for categorical ones
//! - **Splitting**: seeded or random train/test partition
//! - **Progress Reporting**: stage-by-stage updates through a reporter or closure
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use loan_processing::{Pipeline, PipelineConfig, load_csv};
//!
//! let df = load_csv("data/loans.csv")?;
//!
//! let prepared = Pipeline::builder()
//!     .config(PipelineConfig::builder().seed(42).build()?)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process(df)?;
//!
//! println!("Train rows: {}", prepared.train.height());
//! println!("Test rows: {}", prepared.test.height());
//! ```
//!
//! # Configuration
//!
//! Defaults describe the loan dataset: twelve relevant columns, label
//! `status`, sentinel `unknown`, 15% test rows.
//!
//! ```rust,ignore
//! use loan_processing::PipelineConfig;
//!
//! let config = PipelineConfig::builder()
//!     .relevant_columns(["age", "income", "status"])
//!     .missing_value_replacement("n/a")
//!     .test_fraction(0.2)
//!     .build()?;
//! ```
//!
//! The stages can also be used one at a time on a table passed by `&mut`:
//!
//! ```rust,ignore
//! use loan_processing::{ModalImputer, SchemaNormalizer};
//!
//! SchemaNormalizer::from_config(&config)?.normalize(&mut df)?;
//! ModalImputer::from_config(&config).impute(&mut df)?;
//! ```

pub mod config;
pub mod error;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod reporting;
pub mod schema;
pub mod splitter;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{PreprocessingError, Result as PreprocessingResult, ResultExt};
pub use imputers::{ModalImputer, ValueFrequencyTable};
pub use loader::load_csv;
pub use pipeline::{
    ClosureProgressReporter, Pipeline, PipelineBuilder, PreparedDataset, PreprocessingStage,
    ProgressReporter, ProgressUpdate,
};
pub use reporting::DatasetPreview;
pub use schema::{NormalizationOutcome, SchemaNormalizer};
pub use splitter::{TrainTestSplit, train_test_split};
pub use types::{ImputationRecord, ImputationStrategy, PreprocessingSummary};
pub use utils::{DtypeCategory, NumericValue, get_dtype_category, is_numeric_dtype};
