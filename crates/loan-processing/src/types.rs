use serde::{Deserialize, Serialize};

// ============================================================================
// Imputation Types
// ============================================================================

/// How a column's missing values were filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputationStrategy {
    /// Most frequent non-missing value (first seen wins ties).
    Mode,
    /// Fixed replacement string for categorical columns.
    Sentinel,
}

impl ImputationStrategy {
    /// Returns a human-readable name for the strategy.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Mode => "Mode",
            Self::Sentinel => "Sentinel",
        }
    }
}

/// One column fill performed by the imputer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationRecord {
    /// Column that was filled.
    pub column: String,
    /// Strategy used.
    pub strategy: ImputationStrategy,
    /// The value written into the missing cells, rendered as text.
    pub value: String,
    /// Number of cells replaced.
    pub filled: usize,
}

impl ImputationRecord {
    pub fn new(
        column: impl Into<String>,
        strategy: ImputationStrategy,
        value: impl Into<String>,
        filled: usize,
    ) -> Self {
        Self {
            column: column.into(),
            strategy,
            value: value.into(),
            filled,
        }
    }

    /// One-line description used in processing steps.
    pub fn describe(&self) -> String {
        format!(
            "Filled {} missing value(s) in '{}' with {} '{}'",
            self.filled,
            self.column,
            self.strategy.display_name().to_lowercase(),
            self.value
        )
    }
}

// ============================================================================
// Preprocessing Summary
// ============================================================================

/// Serializable summary of what the data preparation pipeline did.
///
/// # Example
///
/// ```rust,ignore
/// let prepared = pipeline.process(df)?;
/// println!(
///     "Kept {} of {} columns in {}ms",
///     prepared.summary.columns_after,
///     prepared.summary.columns_before,
///     prepared.summary.duration_ms
/// );
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreprocessingSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    /// Number of rows in the input table.
    pub rows: usize,
    /// Rows placed in the training split.
    pub train_rows: usize,
    /// Rows placed in the test split.
    pub test_rows: usize,

    /// Number of columns before normalization.
    pub columns_before: usize,
    /// Number of columns after normalization.
    pub columns_after: usize,

    /// Columns removed because they are not allow-listed.
    pub dropped_columns: Vec<String>,
    /// Allow-listed columns absent from the input.
    pub missing_columns: Vec<String>,

    /// Missing cells (null, or empty string in text columns) before imputation.
    pub missing_cells_before: usize,
    /// Missing cells after imputation.
    pub missing_cells_after: usize,

    /// Per-column fills.
    pub imputations: Vec<ImputationRecord>,

    /// Ordered human-readable log of what was done.
    pub processing_steps: Vec<String>,

    /// Warnings and notes generated during preprocessing.
    pub warnings: Vec<String>,
}

impl PreprocessingSummary {
    /// Create a new empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a processing step.
    pub fn add_step(&mut self, step: impl Into<String>) {
        self.processing_steps.push(step.into());
    }

    /// Add a warning to the summary.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Record an imputation, also logging it as a processing step.
    pub fn add_imputation(&mut self, record: ImputationRecord) {
        self.processing_steps.push(record.describe());
        self.imputations.push(record);
    }

    /// Total number of cells filled by the imputer.
    pub fn cells_imputed(&self) -> usize {
        self.imputations.iter().map(|r| r.filled).sum()
    }

    /// Share of rows placed in the test split, as a percentage.
    pub fn test_percentage(&self) -> f32 {
        if self.rows == 0 {
            0.0
        } else {
            (self.test_rows as f32 / self.rows as f32) * 100.0
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocessing_summary_default() {
        let summary = PreprocessingSummary::default();
        assert_eq!(summary.duration_ms, 0);
        assert_eq!(summary.rows, 0);
        assert!(summary.imputations.is_empty());
        assert_eq!(summary.test_percentage(), 0.0);
    }

    #[test]
    fn test_add_imputation_records_step() {
        let mut summary = PreprocessingSummary::new();
        summary.add_imputation(ImputationRecord::new(
            "income",
            ImputationStrategy::Mode,
            "5",
            1,
        ));
        summary.add_imputation(ImputationRecord::new(
            "region",
            ImputationStrategy::Sentinel,
            "unknown",
            2,
        ));

        assert_eq!(summary.cells_imputed(), 3);
        assert_eq!(summary.processing_steps.len(), 2);
        assert_eq!(
            summary.processing_steps[0],
            "Filled 1 missing value(s) in 'income' with mode '5'"
        );
    }

    #[test]
    fn test_test_percentage() {
        let summary = PreprocessingSummary {
            rows: 20,
            train_rows: 17,
            test_rows: 3,
            ..Default::default()
        };
        assert!((summary.test_percentage() - 15.0).abs() < 0.01);
    }

    #[test]
    fn test_imputation_strategy_json_values() {
        assert_eq!(
            serde_json::to_string(&ImputationStrategy::Mode).unwrap(),
            "\"mode\""
        );
        assert_eq!(
            serde_json::to_string(&ImputationStrategy::Sentinel).unwrap(),
            "\"sentinel\""
        );
    }
}
