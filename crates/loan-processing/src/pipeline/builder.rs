//! Main data preparation pipeline.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating normalization, imputation and splitting.

use crate::config::PipelineConfig;
use crate::error::{Result, ResultExt};
use crate::imputers::ModalImputer;
use crate::pipeline::progress::{
    ClosureProgressReporter, PreprocessingStage, ProgressReporter, ProgressUpdate,
};
use crate::schema::SchemaNormalizer;
use crate::splitter::train_test_split;
use crate::types::PreprocessingSummary;
use crate::utils::{DtypeCategory, series_dtype_category};
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Output of [`Pipeline::process`].
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    /// The full normalized and imputed table.
    pub cleaned: DataFrame,
    /// Training rows.
    pub train: DataFrame,
    /// Held-out rows.
    pub test: DataFrame,
    /// Lowercased label column name.
    pub label_column: String,
    /// What the pipeline did.
    pub summary: PreprocessingSummary,
}

/// The data preparation pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use loan_processing::{Pipeline, PipelineConfig};
///
/// let prepared = Pipeline::builder()
///     .config(PipelineConfig::builder().seed(42).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .process(dataframe)?;
///
/// println!("{} train / {} test rows", prepared.train.height(), prepared.test.height());
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    normalizer: SchemaNormalizer,
    imputer: ModalImputer,
}

static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Normalize, impute and split a table.
    ///
    /// Every error is fatal; a `Failed` progress update is emitted before it
    /// is returned.
    pub fn process(&self, df: DataFrame) -> Result<PreparedDataset> {
        match self.process_internal(df) {
            Ok(prepared) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(prepared)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Normalize the schema and impute missing values in place.
    ///
    /// Returns the summary of both stages; split counts are left at zero.
    pub fn prepare(&self, df: &mut DataFrame) -> Result<PreprocessingSummary> {
        let mut summary = PreprocessingSummary::new();
        summary.rows = df.height();
        summary.columns_before = df.width();

        self.report_progress(ProgressUpdate::new(
            PreprocessingStage::SchemaNormalization,
            0.0,
            "Normalizing column names and label",
        ));
        let outcome = self
            .normalizer
            .normalize(df)
            .context("During schema normalization")?;
        summary.columns_after = df.width();
        summary.add_step(format!(
            "Kept {} of {} columns",
            summary.columns_after, summary.columns_before
        ));
        if !outcome.dropped_columns.is_empty() {
            summary.add_step(format!(
                "Dropped columns: {}",
                outcome.dropped_columns.join(", ")
            ));
        }
        for column in &outcome.missing_columns {
            summary.add_warning(format!("Relevant column '{}' is not in the dataset", column));
        }
        summary.add_step(format!(
            "Mapped label '{}' to boolean ({} positive)",
            self.normalizer.label_column(),
            outcome.positive_labels
        ));
        summary.dropped_columns = outcome.dropped_columns;
        summary.missing_columns = outcome.missing_columns;

        summary.missing_cells_before = count_missing_cells(df)?;

        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        let total = names.len();
        for (idx, name) in names.iter().enumerate() {
            self.report_progress(ProgressUpdate::with_items(
                PreprocessingStage::Imputation,
                format!("Column: {}", name),
                idx,
                total,
                format!("Imputing column {}", name),
            ));
            if let Some(record) = self.imputer.impute_column(df, name)? {
                summary.add_imputation(record);
            }
        }
        summary.missing_cells_after = count_missing_cells(df)?;
        debug!(
            "Missing cells: {} before imputation, {} after",
            summary.missing_cells_before, summary.missing_cells_after
        );

        Ok(summary)
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_internal(&self, mut df: DataFrame) -> Result<PreparedDataset> {
        let start_time = Instant::now();

        info!("Starting data preparation pipeline...");
        self.report_progress(ProgressUpdate::new(
            PreprocessingStage::Initializing,
            0.0,
            format!("Preparing {} rows x {} columns", df.height(), df.width()),
        ));

        let mut summary = self.prepare(&mut df)?;

        self.report_progress(ProgressUpdate::new(
            PreprocessingStage::Splitting,
            0.0,
            "Splitting rows into train and test",
        ));
        let split = train_test_split(&df, self.config.test_fraction, self.config.seed)
            .context("During train/test split")?;
        summary.train_rows = split.train.height();
        summary.test_rows = split.test.height();
        summary.add_step(format!(
            "Split {} rows into {} train / {} test",
            summary.rows, summary.train_rows, summary.test_rows
        ));

        summary.duration_ms = start_time.elapsed().as_millis() as u64;
        info!("Data preparation finished in {}ms", summary.duration_ms);

        Ok(PreparedDataset {
            cleaned: df,
            train: split.train,
            test: split.test,
            label_column: self.normalizer.label_column().to_string(),
            summary,
        })
    }
}

/// Count nulls in every column plus empty strings in text columns.
pub fn count_missing_cells(df: &DataFrame) -> Result<usize> {
    let mut missing = 0;
    for column in df.get_columns() {
        let series = column.as_materialized_series();
        missing += series.null_count();
        if series_dtype_category(series) == DtypeCategory::String {
            let as_str = series.cast(&DataType::String)?;
            missing += as_str
                .str()?
                .into_iter()
                .filter(|v| matches!(v, Some(s) if s.is_empty()))
                .count();
        }
    }
    Ok(missing)
}

/// Builder for [`Pipeline`].
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = Pipeline::builder()
///     .config(PipelineConfig::default())
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?;
/// ```
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let normalizer = SchemaNormalizer::from_config(&config)?;
        let imputer = ModalImputer::from_config(&config);

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
            normalizer,
            imputer,
        })
    }
}
