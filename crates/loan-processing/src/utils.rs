//! Shared utilities for the data preparation pipeline.
//!
//! This module contains helpers used across the normalizer, imputer and
//! preview code so that column-kind decisions are made in exactly one place.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for preprocessing purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

/// Get the dtype category of a Series.
pub fn series_dtype_category(series: &Series) -> DtypeCategory {
    get_dtype_category(series.dtype())
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// A fill value in the native domain of a numeric column.
///
/// Integers stay integers so values beyond 2^53 survive the fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericValue {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl std::fmt::Display for NumericValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Signed(v) => write!(f, "{}", v),
            Self::Unsigned(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Fill null values in a numeric Series with a specific value.
///
/// Present values are never rewritten; only the fill value is cast. The result
/// keeps the dtype of the input series.
pub fn fill_numeric_nulls(series: &Series, fill_value: NumericValue) -> PolarsResult<Series> {
    let filled = match fill_value {
        NumericValue::Signed(v) => series
            .cast(&DataType::Int64)?
            .i64()?
            .fill_null_with_values(v)?
            .into_series(),
        NumericValue::Unsigned(v) => series
            .cast(&DataType::UInt64)?
            .u64()?
            .fill_null_with_values(v)?
            .into_series(),
        NumericValue::Float(v) => series
            .cast(&DataType::Float64)?
            .f64()?
            .fill_null_with_values(v)?
            .into_series(),
    };

    filled.cast(series.dtype())
}

/// Replace null and empty values in a string Series with a specific value.
///
/// Returns the filled series and the number of replaced cells.
pub fn fill_string_missing(series: &Series, fill_value: &str) -> PolarsResult<(Series, usize)> {
    let as_str = series.cast(&DataType::String)?;
    let mut replaced = 0usize;
    let values: Vec<String> = as_str
        .str()?
        .into_iter()
        .map(|v| match v {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => {
                replaced += 1;
                fill_value.to_string()
            }
        })
        .collect();

    Ok((Series::new(series.name().clone(), values), replaced))
}

/// Render a single cell for console output. Missing values render as empty.
pub fn format_cell(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        other => match other.get_str() {
            Some(s) => s.to_string(),
            None => format!("{}", other),
        },
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_dtype_category() {
        assert_eq!(get_dtype_category(&DataType::Int64), DtypeCategory::Numeric);
        assert_eq!(
            get_dtype_category(&DataType::Float32),
            DtypeCategory::Numeric
        );
        assert_eq!(get_dtype_category(&DataType::Date), DtypeCategory::Datetime);
        assert_eq!(
            get_dtype_category(&DataType::Boolean),
            DtypeCategory::Boolean
        );
        assert_eq!(get_dtype_category(&DataType::String), DtypeCategory::String);
    }

    #[test]
    fn test_fill_numeric_nulls_preserves_dtype() {
        let series = Series::new("term".into(), &[Some(360i64), None, Some(180)]);
        let filled = fill_numeric_nulls(&series, NumericValue::Signed(360)).unwrap();

        assert_eq!(filled.dtype(), &DataType::Int64);
        assert_eq!(filled.null_count(), 0);
        assert_eq!(filled.get(1).unwrap().try_extract::<i64>().unwrap(), 360);
        assert_eq!(filled.get(2).unwrap().try_extract::<i64>().unwrap(), 180);
    }

    #[test]
    fn test_fill_numeric_nulls_keeps_large_integers_exact() {
        let big = 9_007_199_254_740_993i64;
        let series = Series::new("loan_amount".into(), &[Some(big), None, Some(big - 2)]);
        let filled = fill_numeric_nulls(&series, NumericValue::Signed(big)).unwrap();

        let values: Vec<i64> = filled.i64().unwrap().into_no_null_iter().collect();
        assert_eq!(values, vec![big, big, big - 2]);

        let unsigned = Series::new("id".into(), &[None, Some(u64::MAX)]);
        let filled = fill_numeric_nulls(&unsigned, NumericValue::Unsigned(u64::MAX)).unwrap();
        assert_eq!(filled.dtype(), &DataType::UInt64);
        assert_eq!(filled.u64().unwrap().get(0), Some(u64::MAX));
    }

    #[test]
    fn test_numeric_value_display() {
        assert_eq!(NumericValue::Signed(-5).to_string(), "-5");
        assert_eq!(NumericValue::Float(80.5).to_string(), "80.5");
    }

    #[test]
    fn test_fill_string_missing_counts_nulls_and_empties() {
        let series = Series::new("region".into(), &[Some("south"), Some(""), None]);
        let (filled, replaced) = fill_string_missing(&series, "unknown").unwrap();

        assert_eq!(replaced, 2);
        let values: Vec<&str> = filled.str().unwrap().into_no_null_iter().collect();
        assert_eq!(values, vec!["south", "unknown", "unknown"]);
    }

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(&AnyValue::Null), "");
        assert_eq!(format_cell(&AnyValue::String("north")), "north");
        assert_eq!(format_cell(&AnyValue::Boolean(true)), "true");
        assert_eq!(format_cell(&AnyValue::Int64(42)), "42");
    }
}
