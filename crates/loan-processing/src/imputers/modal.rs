//! Modal and sentinel imputation.
//!
//! Numeric and boolean columns get their most frequent value, categorical
//! columns get a fixed replacement string. The label column is never touched.

use super::frequency::ValueFrequencyTable;
use crate::config::PipelineConfig;
use crate::error::{PreprocessingError, Result};
use crate::types::{ImputationRecord, ImputationStrategy};
use crate::utils::{
    DtypeCategory, NumericValue, fill_numeric_nulls, fill_string_missing, series_dtype_category,
};
use polars::prelude::*;
use tracing::{debug, info};

/// Fills missing values column by column, in place.
#[derive(Debug, Clone)]
pub struct ModalImputer {
    label_column: String,
    missing_value_replacement: String,
}

impl ModalImputer {
    pub fn new(
        label_column: impl Into<String>,
        missing_value_replacement: impl Into<String>,
    ) -> Self {
        Self {
            label_column: label_column.into(),
            missing_value_replacement: missing_value_replacement.into(),
        }
    }

    /// Create an imputer for tables already passed through the schema normalizer.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.normalized_label_column(),
            config.missing_value_replacement.clone(),
        )
    }

    /// Impute every column of the table, in column order.
    pub fn impute(&self, df: &mut DataFrame) -> Result<Vec<ImputationRecord>> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();

        let mut records = Vec::new();
        for name in &names {
            if let Some(record) = self.impute_column(df, name)? {
                records.push(record);
            }
        }

        info!(
            "Imputation complete: {} column(s) filled, {} cell(s) replaced",
            records.len(),
            records.iter().map(|r| r.filled).sum::<usize>()
        );
        Ok(records)
    }

    /// Impute a single column. Returns `None` when nothing had to be filled.
    ///
    /// A numeric or boolean column with rows but no present values fails with
    /// [`PreprocessingError::NoValidValues`].
    pub fn impute_column(
        &self,
        df: &mut DataFrame,
        name: &str,
    ) -> Result<Option<ImputationRecord>> {
        if name == self.label_column {
            debug!("Skipping label column '{}'", name);
            return Ok(None);
        }

        let series = df.column(name)?.as_materialized_series().clone();

        let record = match series_dtype_category(&series) {
            DtypeCategory::Numeric => {
                let missing = series.null_count();
                if missing == 0 {
                    return Ok(None);
                }
                let mode = numeric_mode(&series)?
                    .ok_or_else(|| PreprocessingError::NoValidValues(name.to_string()))?;
                let filled = fill_numeric_nulls(&series, mode).map_err(|e| {
                    PreprocessingError::ImputationFailed {
                        column: name.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                df.replace(name, filled)?;

                ImputationRecord::new(name, ImputationStrategy::Mode, mode.to_string(), missing)
            }
            DtypeCategory::Boolean => {
                let missing = series.null_count();
                if missing == 0 {
                    return Ok(None);
                }
                let mode = boolean_mode(&series)?
                    .ok_or_else(|| PreprocessingError::NoValidValues(name.to_string()))?;
                let values: Vec<bool> = series
                    .bool()?
                    .into_iter()
                    .map(|v| v.unwrap_or(mode))
                    .collect();
                df.replace(name, Series::new(series.name().clone(), values))?;

                ImputationRecord::new(name, ImputationStrategy::Mode, mode.to_string(), missing)
            }
            DtypeCategory::String => {
                let (filled, replaced) =
                    fill_string_missing(&series, &self.missing_value_replacement).map_err(|e| {
                        PreprocessingError::ImputationFailed {
                            column: name.to_string(),
                            reason: e.to_string(),
                        }
                    })?;
                if replaced == 0 {
                    return Ok(None);
                }
                df.replace(name, filled)?;

                ImputationRecord::new(
                    name,
                    ImputationStrategy::Sentinel,
                    self.missing_value_replacement.as_str(),
                    replaced,
                )
            }
            DtypeCategory::Datetime | DtypeCategory::Other => {
                if series.null_count() > 0 {
                    debug!(
                        "Leaving {} missing value(s) in '{}' ({}) untouched",
                        series.null_count(),
                        name,
                        series.dtype()
                    );
                }
                return Ok(None);
            }
        };

        debug!("{}", record.describe());
        Ok(Some(record))
    }
}

/// Most frequent non-null value of a numeric series, first seen on ties.
///
/// Integer columns are counted as integers, so the mode is exact at any magnitude.
pub fn numeric_mode(series: &Series) -> PolarsResult<Option<NumericValue>> {
    let dtype = series.dtype();
    if dtype.is_unsigned_integer() {
        let as_unsigned = series.cast(&DataType::UInt64)?;
        let table: ValueFrequencyTable<u64> = as_unsigned.u64()?.into_iter().flatten().collect();
        return Ok(table.mode().map(|v| NumericValue::Unsigned(*v)));
    }
    if dtype.is_signed_integer() {
        let as_signed = series.cast(&DataType::Int64)?;
        let table: ValueFrequencyTable<i64> = as_signed.i64()?.into_iter().flatten().collect();
        return Ok(table.mode().map(|v| NumericValue::Signed(*v)));
    }

    let as_float = series.cast(&DataType::Float64)?;
    let table: ValueFrequencyTable<u64> = as_float
        .f64()?
        .into_iter()
        .flatten()
        // -0.0 and 0.0 count as the same value
        .map(|v| if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() })
        .collect();

    Ok(table.mode().map(|bits| NumericValue::Float(f64::from_bits(*bits))))
}

/// Most frequent non-null value of a boolean series, first seen on ties.
pub fn boolean_mode(series: &Series) -> PolarsResult<Option<bool>> {
    let table: ValueFrequencyTable<bool> = series.bool()?.into_iter().flatten().collect();
    Ok(table.mode().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn imputer() -> ModalImputer {
        ModalImputer::new("status", "unknown")
    }

    #[test]
    fn test_numeric_mode_fill() {
        let mut df = df![
            "income" => [Some(5i64), Some(5), Some(7), None],
            "status" => [true, false, true, false],
        ]
        .unwrap();

        let records = imputer().impute(&mut df).unwrap();

        let income: Vec<i64> = df
            .column("income")
            .unwrap()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(income, vec![5, 5, 7, 5]);
        assert_eq!(df.column("income").unwrap().dtype(), &DataType::Int64);
        assert_eq!(
            records,
            vec![ImputationRecord::new("income", ImputationStrategy::Mode, "5", 1)]
        );
    }

    #[test]
    fn test_large_integer_fill_is_exact() {
        let big = 9_007_199_254_740_993i64;
        let mut df = df![
            "loan_amount" => [Some(big), Some(big), None],
        ]
        .unwrap();

        let records = imputer().impute(&mut df).unwrap();

        let amounts: Vec<i64> = df
            .column("loan_amount")
            .unwrap()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(amounts, vec![big, big, big]);
        assert_eq!(records[0].value, "9007199254740993");
    }

    #[test]
    fn test_numeric_mode_tie_uses_first_seen() {
        let mut df = df![
            "ltv" => [Some(80.5), Some(92.0), Some(92.0), Some(80.5), None],
        ]
        .unwrap();

        imputer().impute(&mut df).unwrap();

        let value = df.column("ltv").unwrap().f64().unwrap().get(4);
        assert_eq!(value, Some(80.5));
    }

    #[test]
    fn test_categorical_sentinel_fill() {
        let mut df = df![
            "region" => [Some("CA"), Some(""), Some("NY"), None],
        ]
        .unwrap();

        let records = imputer().impute(&mut df).unwrap();

        let region: Vec<&str> = df
            .column("region")
            .unwrap()
            .str()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(region, vec!["CA", "unknown", "NY", "unknown"]);
        assert_eq!(records[0].strategy, ImputationStrategy::Sentinel);
        assert_eq!(records[0].filled, 2);
    }

    #[test]
    fn test_label_column_is_excluded() {
        let mut df = df![
            "age" => [Some(30i64), None, Some(30)],
            "status" => [Some(1i64), None, Some(1)],
        ]
        .unwrap();

        let records = imputer().impute(&mut df).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(df.column("status").unwrap().null_count(), 1);
    }

    #[test]
    fn test_all_missing_numeric_column_fails() {
        let mut df = df![
            "credit_score" => [None::<i64>, None, None],
        ]
        .unwrap();

        let err = imputer().impute(&mut df).unwrap_err();
        assert!(matches!(err, PreprocessingError::NoValidValues(ref c) if c == "credit_score"));
        assert_eq!(err.error_code(), "EMPTY_COLUMN");
    }

    #[test]
    fn test_boolean_feature_mode_fill() {
        let mut df = df![
            "joint" => [Some(false), Some(true), Some(true), None],
        ]
        .unwrap();

        imputer().impute(&mut df).unwrap();

        let joint: Vec<bool> = df
            .column("joint")
            .unwrap()
            .bool()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(joint, vec![false, true, true, true]);
    }

    #[test]
    fn test_complete_columns_are_untouched() {
        let mut df = df![
            "age" => [30i64, 40],
            "region" => ["north", "south"],
        ]
        .unwrap();
        let before = df.clone();

        let records = imputer().impute(&mut df).unwrap();

        assert!(records.is_empty());
        assert!(df.equals(&before));
    }

    #[test]
    fn test_numeric_mode_helper() {
        let series = Series::new("x".into(), &[Some(1.0), None, Some(-0.0), Some(0.0), Some(1.0)]);
        // 1.0 seen first and tied with 0.0 at two occurrences
        assert_eq!(numeric_mode(&series).unwrap(), Some(NumericValue::Float(1.0)));

        let empty = Series::new("x".into(), &[None::<f64>, None]);
        assert_eq!(numeric_mode(&empty).unwrap(), None);
    }
}
