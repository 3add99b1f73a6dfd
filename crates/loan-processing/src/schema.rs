//! Schema normalization.
//!
//! Brings a freshly loaded table into the shape the rest of the pipeline
//! expects: lowercase column names, only allow-listed columns, and a boolean
//! label column.

use crate::config::PipelineConfig;
use crate::error::{PreprocessingError, Result, ResultExt};
use crate::utils::{DtypeCategory, series_dtype_category};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// What the normalizer changed in the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationOutcome {
    /// Columns removed because they are not allow-listed (lowercased names).
    pub dropped_columns: Vec<String>,
    /// Allow-listed columns that the table does not contain.
    pub missing_columns: Vec<String>,
    /// Label cells mapped to `true`.
    pub positive_labels: usize,
}

/// Lowercases names, applies the column allow-list and maps the label to boolean.
#[derive(Debug, Clone)]
pub struct SchemaNormalizer {
    relevant_columns: Vec<String>,
    label_column: String,
}

impl SchemaNormalizer {
    /// Create a normalizer. Names are matched case-insensitively.
    ///
    /// Fails with [`PreprocessingError::LabelNotFound`] when the label is not
    /// part of the allow-list.
    pub fn new<I, S>(relevant_columns: I, label_column: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let relevant_columns: Vec<String> = relevant_columns
            .into_iter()
            .map(|c| c.as_ref().to_lowercase())
            .collect();
        let label_column = label_column.to_lowercase();

        if relevant_columns.is_empty() {
            return Err(PreprocessingError::InvalidConfig(
                "the list of relevant columns is empty".to_string(),
            ));
        }
        if !relevant_columns.contains(&label_column) {
            return Err(PreprocessingError::LabelNotFound(label_column)
                .with_context("Label column must be one of the relevant columns"));
        }

        Ok(Self {
            relevant_columns,
            label_column,
        })
    }

    /// Create a normalizer from the pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Self::new(&config.relevant_columns, &config.label_column)
    }

    /// The lowercased label column name.
    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    /// The lowercased allow-list.
    pub fn relevant_columns(&self) -> &[String] {
        &self.relevant_columns
    }

    /// Normalize the table in place.
    ///
    /// Validation happens before any mutation, so on error the table is
    /// unchanged. Running this twice on the same table is a no-op.
    pub fn normalize(&self, df: &mut DataFrame) -> Result<NormalizationOutcome> {
        let original_names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();

        let mut seen = HashSet::with_capacity(original_names.len());
        for name in &original_names {
            let lowered = name.to_lowercase();
            if !seen.insert(lowered.clone()) {
                return Err(PreprocessingError::DuplicateColumn(lowered));
            }
        }
        if !seen.contains(&self.label_column) {
            return Err(PreprocessingError::LabelNotFound(self.label_column.clone()));
        }

        for name in &original_names {
            let lowered = name.to_lowercase();
            if *name != lowered {
                debug!("Renaming column '{}' to '{}'", name, lowered);
                df.rename(name, lowered.into())
                    .context(format!("Failed to rename column '{}'", name))?;
            }
        }

        let mut outcome = NormalizationOutcome::default();
        let mut kept = Vec::with_capacity(self.relevant_columns.len());
        for name in original_names.iter().map(|n| n.to_lowercase()) {
            if self.relevant_columns.contains(&name) {
                kept.push(name);
            } else {
                debug!("Dropping column '{}' (not in the relevant columns)", name);
                outcome.dropped_columns.push(name);
            }
        }
        if !outcome.dropped_columns.is_empty() {
            *df = df.select(kept)?;
        }

        for column in &self.relevant_columns {
            if df.column(column).is_err() {
                warn!("Relevant column '{}' is not present in the dataset", column);
                outcome.missing_columns.push(column.clone());
            }
        }

        outcome.positive_labels = self.map_label(df)?;

        info!(
            "Schema normalized: {} columns kept, {} dropped, {} positive labels",
            df.width(),
            outcome.dropped_columns.len(),
            outcome.positive_labels
        );

        Ok(outcome)
    }

    /// Replace the label column with its boolean mapping and return the number of `true` cells.
    fn map_label(&self, df: &mut DataFrame) -> Result<usize> {
        let series = df
            .column(&self.label_column)?
            .as_materialized_series()
            .clone();
        let labels = label_to_bool(&series)
            .context(format!("Failed to map label column '{}'", self.label_column))?;
        let positives = labels.iter().filter(|v| **v).count();

        df.replace(
            &self.label_column,
            Series::new(self.label_column.as_str().into(), labels),
        )?;
        Ok(positives)
    }
}

/// Map label cells to booleans: a value equal to 1 is `true`, everything else,
/// missing included, is `false`. Boolean labels keep their values.
pub fn label_to_bool(series: &Series) -> PolarsResult<Vec<bool>> {
    let values = match series_dtype_category(series) {
        DtypeCategory::Boolean => series
            .bool()?
            .into_iter()
            .map(|v| v.unwrap_or(false))
            .collect(),
        DtypeCategory::Numeric => series
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v == Some(1.0))
            .collect(),
        _ => series
            .cast(&DataType::String)?
            .str()?
            .into_iter()
            .map(|v| v.and_then(|s| s.trim().parse::<f64>().ok()) == Some(1.0))
            .collect(),
    };
    Ok(values)
}
