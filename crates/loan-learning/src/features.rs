//! Feature pipeline: one-hot encoding, concatenation and standardization.
//!
//! A [`FeaturePipelineSpec`] only declares which columns become features and
//! how. Fitting it on a training table learns the category universes and the
//! per-feature mean and standard deviation, producing a
//! [`FittedFeaturePipeline`] that turns any table with the same columns into
//! a dense `ndarray` matrix.
//!
//! Encoding rules:
//! - categorical columns become one indicator feature per category seen in
//!   training, categories ordered by value; unseen categories encode as zeros
//! - numeric columns pass through as one feature
//! - boolean columns become one 0/1 feature
//! - features are concatenated in table column order, then centred and scaled
//!   with statistics learned from training (zero-variance features are only
//!   centred)

use crate::error::{LearningError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// How a column is turned into features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Categorical,
    Numeric,
    Boolean,
}

impl FeatureKind {
    /// Classify a polars dtype. Returns `None` for dtypes that cannot be encoded.
    pub fn from_dtype(dtype: &DataType) -> Option<Self> {
        match dtype {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64 => Some(Self::Numeric),
            DataType::Boolean => Some(Self::Boolean),
            DataType::String | DataType::Categorical(_, _) => Some(Self::Categorical),
            _ => None,
        }
    }
}

/// A feature column and its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureColumn {
    pub name: String,
    pub kind: FeatureKind,
}

/// Declared feature transform chain. Nothing is learned until [`fit`](Self::fit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePipelineSpec {
    /// Boolean label column, excluded from the features.
    pub label_column: String,
    /// Feature columns in table order.
    pub columns: Vec<FeatureColumn>,
    /// Whether to standardize the concatenated features.
    pub normalize: bool,
}

impl FeaturePipelineSpec {
    /// Declare the transform chain for every non-label column of `df`.
    ///
    /// Fails with [`LearningError::LabelNotFound`] if the label is missing and
    /// with [`LearningError::InvalidData`] if a column has a dtype that cannot
    /// be encoded.
    pub fn from_frame(df: &DataFrame, label_column: &str) -> Result<Self> {
        if df.column(label_column).is_err() {
            return Err(LearningError::LabelNotFound(label_column.to_string()));
        }

        let mut columns = Vec::with_capacity(df.width().saturating_sub(1));
        for column in df.get_columns() {
            let name = column.name().as_str();
            if name == label_column {
                continue;
            }
            let kind = FeatureKind::from_dtype(column.dtype()).ok_or_else(|| {
                LearningError::InvalidData(format!(
                    "column '{}' has dtype {} which cannot be used as a feature",
                    name,
                    column.dtype()
                ))
            })?;
            columns.push(FeatureColumn {
                name: name.to_string(),
                kind,
            });
        }

        if columns.is_empty() {
            return Err(LearningError::InvalidData(
                "the table has no feature columns".to_string(),
            ));
        }

        Ok(Self {
            label_column: label_column.to_string(),
            columns,
            normalize: true,
        })
    }

    /// Learn category universes and scaling statistics from `train`.
    pub fn fit(&self, train: &DataFrame) -> Result<FittedFeaturePipeline> {
        if train.height() == 0 {
            return Err(LearningError::InvalidData(
                "cannot fit the feature pipeline on an empty table".to_string(),
            ));
        }

        let mut encoders = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let encoder = match column.kind {
                FeatureKind::Categorical => ColumnEncoder::OneHot {
                    column: column.name.clone(),
                    categories: category_universe(train, &column.name)?,
                },
                FeatureKind::Numeric => ColumnEncoder::Numeric {
                    column: column.name.clone(),
                },
                FeatureKind::Boolean => ColumnEncoder::Boolean {
                    column: column.name.clone(),
                },
            };
            debug!(
                "Feature column '{}' encodes to {} feature(s)",
                column.name,
                encoder.width()
            );
            encoders.push(encoder);
        }

        let mut fitted = FittedFeaturePipeline {
            label_column: self.label_column.clone(),
            encoders,
            scaler: None,
        };

        if self.normalize {
            let raw = fitted.encode(train)?;
            fitted.scaler = Some(StandardScaler::fit(&raw));
        }

        Ok(fitted)
    }
}

/// Distinct non-null values of a text column, sorted.
fn category_universe(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    let series = df.column(column)?.as_materialized_series().cast(&DataType::String)?;
    let categories: BTreeSet<String> = series
        .str()?
        .into_iter()
        .flatten()
        .map(|s| s.to_string())
        .collect();
    Ok(categories.into_iter().collect())
}

/// Learned encoding for one input column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "encoding", rename_all = "snake_case")]
pub enum ColumnEncoder {
    OneHot {
        column: String,
        categories: Vec<String>,
    },
    Numeric {
        column: String,
    },
    Boolean {
        column: String,
    },
}

impl ColumnEncoder {
    pub fn column(&self) -> &str {
        match self {
            Self::OneHot { column, .. } | Self::Numeric { column } | Self::Boolean { column } => {
                column
            }
        }
    }

    /// Number of features this column contributes.
    pub fn width(&self) -> usize {
        match self {
            Self::OneHot { categories, .. } => categories.len(),
            Self::Numeric { .. } | Self::Boolean { .. } => 1,
        }
    }

    /// Names of the produced features, `column=category` for indicators.
    pub fn feature_names(&self) -> Vec<String> {
        match self {
            Self::OneHot { column, categories } => categories
                .iter()
                .map(|c| format!("{}={}", column, c))
                .collect(),
            Self::Numeric { column } | Self::Boolean { column } => vec![column.clone()],
        }
    }

    /// Write this column's features into `out` starting at column `offset`.
    fn encode_into(&self, df: &DataFrame, out: &mut Array2<f64>, offset: usize) -> Result<()> {
        let name = self.column();
        let column = df.column(name).map_err(|_| {
            LearningError::SchemaMismatch(format!("feature column '{}' is missing", name))
        })?;
        let series = column.as_materialized_series();
        if series.null_count() > 0 {
            return Err(LearningError::InvalidData(format!(
                "feature column '{}' contains {} missing value(s)",
                name,
                series.null_count()
            )));
        }

        let kind_error = |e: PolarsError| {
            LearningError::InvalidData(format!(
                "feature column '{}' has the wrong kind: {}",
                name, e
            ))
        };

        match self {
            Self::OneHot { categories, .. } => {
                let values = series.cast(&DataType::String).map_err(kind_error)?;
                for (row, value) in values.str().map_err(kind_error)?.into_iter().enumerate() {
                    let position = value.and_then(|v| {
                        categories.binary_search_by(|c| c.as_str().cmp(v)).ok()
                    });
                    if let Some(position) = position {
                        out[[row, offset + position]] = 1.0;
                    }
                }
            }
            Self::Numeric { .. } => {
                if FeatureKind::from_dtype(series.dtype()) != Some(FeatureKind::Numeric) {
                    return Err(LearningError::InvalidData(format!(
                        "feature column '{}' must be numeric, found {}",
                        name,
                        series.dtype()
                    )));
                }
                let values = series.cast(&DataType::Float64).map_err(kind_error)?;
                let values = values.f64().map_err(kind_error)?;
                for (row, value) in values.into_no_null_iter().enumerate() {
                    out[[row, offset]] = value;
                }
            }
            Self::Boolean { .. } => {
                let values = series.bool().map_err(kind_error)?;
                for (row, value) in values.into_no_null_iter().enumerate() {
                    out[[row, offset]] = if value { 1.0 } else { 0.0 };
                }
            }
        }
        Ok(())
    }
}

/// Column-wise zero-mean, unit-variance scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
}

impl StandardScaler {
    /// Learn per-column mean and population standard deviation.
    ///
    /// A column with zero variance gets a scale of 1.0.
    pub fn fit(x: &Array2<f64>) -> Self {
        let rows = x.nrows().max(1) as f64;
        let mut means = Vec::with_capacity(x.ncols());
        let mut scales = Vec::with_capacity(x.ncols());

        for column in x.columns() {
            let mean = column.sum() / rows;
            let variance = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / rows;
            let std = variance.sqrt();
            means.push(mean);
            scales.push(if std > 0.0 { std } else { 1.0 });
        }

        Self { means, scales }
    }

    pub fn transform(&self, x: &mut Array2<f64>) {
        for (j, mut column) in x.columns_mut().into_iter().enumerate() {
            let (mean, scale) = (self.means[j], self.scales[j]);
            column.mapv_inplace(|v| (v - mean) / scale);
        }
    }
}

/// Feature pipeline with learned state, ready to transform tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedFeaturePipeline {
    label_column: String,
    encoders: Vec<ColumnEncoder>,
    scaler: Option<StandardScaler>,
}

impl FittedFeaturePipeline {
    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    pub fn encoders(&self) -> &[ColumnEncoder] {
        &self.encoders
    }

    pub fn scaler(&self) -> Option<&StandardScaler> {
        self.scaler.as_ref()
    }

    /// Total number of features after encoding.
    pub fn n_features(&self) -> usize {
        self.encoders.iter().map(ColumnEncoder::width).sum()
    }

    /// Feature names in matrix column order.
    pub fn feature_names(&self) -> Vec<String> {
        self.encoders
            .iter()
            .flat_map(ColumnEncoder::feature_names)
            .collect()
    }

    /// Encode, concatenate and scale `df` into a `rows x n_features` matrix.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let mut x = self.encode(df)?;
        if let Some(scaler) = &self.scaler {
            scaler.transform(&mut x);
        }
        Ok(x)
    }

    /// Extract the boolean label column.
    pub fn labels(&self, df: &DataFrame) -> Result<Array1<bool>> {
        extract_labels(df, &self.label_column)
    }

    fn encode(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let mut x = Array2::<f64>::zeros((df.height(), self.n_features()));
        let mut offset = 0;
        for encoder in &self.encoders {
            encoder.encode_into(df, &mut x, offset)?;
            offset += encoder.width();
        }
        Ok(x)
    }
}

/// Read a boolean label column without missing values.
pub fn extract_labels(df: &DataFrame, label_column: &str) -> Result<Array1<bool>> {
    let column = df
        .column(label_column)
        .map_err(|_| LearningError::LabelNotFound(label_column.to_string()))?;
    let series = column.as_materialized_series();
    if series.null_count() > 0 {
        return Err(LearningError::InvalidData(format!(
            "label column '{}' contains missing values",
            label_column
        )));
    }
    let labels = series.bool().map_err(|_| {
        LearningError::InvalidData(format!(
            "label column '{}' must be boolean, found {}",
            label_column,
            series.dtype()
        ))
    })?;
    Ok(labels.into_no_null_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df![
            "region" => ["south", "north", "south", "central"],
            "income" => [1000i64, 2000, 3000, 4000],
            "joint" => [true, false, false, true],
            "status" => [true, false, true, false],
        ]
        .unwrap()
    }

    #[test]
    fn test_spec_from_frame() {
        let spec = FeaturePipelineSpec::from_frame(&sample(), "status").unwrap();

        assert_eq!(
            spec.columns,
            vec![
                FeatureColumn { name: "region".into(), kind: FeatureKind::Categorical },
                FeatureColumn { name: "income".into(), kind: FeatureKind::Numeric },
                FeatureColumn { name: "joint".into(), kind: FeatureKind::Boolean },
            ]
        );
        assert!(spec.normalize);
    }

    #[test]
    fn test_spec_requires_label() {
        let err = FeaturePipelineSpec::from_frame(&sample(), "approved").unwrap_err();
        assert!(matches!(err, LearningError::LabelNotFound(_)));
    }

    #[test]
    fn test_one_hot_categories_ordered_by_value() {
        let spec = FeaturePipelineSpec::from_frame(&sample(), "status").unwrap();
        let fitted = spec.fit(&sample()).unwrap();

        assert_eq!(
            fitted.feature_names(),
            vec!["region=central", "region=north", "region=south", "income", "joint"]
        );
        assert_eq!(fitted.n_features(), 5);
    }

    #[test]
    fn test_transform_without_scaling() {
        let mut spec = FeaturePipelineSpec::from_frame(&sample(), "status").unwrap();
        spec.normalize = false;
        let fitted = spec.fit(&sample()).unwrap();

        let x = fitted.transform(&sample()).unwrap();

        assert_eq!(x.shape(), &[4, 5]);
        assert_eq!(x.row(0).to_vec(), vec![0.0, 0.0, 1.0, 1000.0, 1.0]);
        assert_eq!(x.row(3).to_vec(), vec![1.0, 0.0, 0.0, 4000.0, 1.0]);
    }

    #[test]
    fn test_standardized_features_have_zero_mean_unit_variance() {
        let spec = FeaturePipelineSpec::from_frame(&sample(), "status").unwrap();
        let fitted = spec.fit(&sample()).unwrap();
        let x = fitted.transform(&sample()).unwrap();

        for column in x.columns() {
            let mean = column.sum() / 4.0;
            let variance = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 4.0;
            assert!(mean.abs() < 1e-9);
            assert!((variance - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_variance_feature_is_only_centred() {
        let df = df![
            "term" => [360i64, 360, 360],
            "status" => [true, false, true],
        ]
        .unwrap();
        let fitted = FeaturePipelineSpec::from_frame(&df, "status")
            .unwrap()
            .fit(&df)
            .unwrap();

        let scaler = fitted.scaler().unwrap();
        assert_eq!(scaler.means, vec![360.0]);
        assert_eq!(scaler.scales, vec![1.0]);
        assert!(fitted.transform(&df).unwrap().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_unseen_category_encodes_as_zeros() {
        let mut spec = FeaturePipelineSpec::from_frame(&sample(), "status").unwrap();
        spec.normalize = false;
        let fitted = spec.fit(&sample()).unwrap();

        let unseen = df![
            "region" => ["east"],
            "income" => [1500i64],
            "joint" => [false],
            "status" => [true],
        ]
        .unwrap();
        let x = fitted.transform(&unseen).unwrap();

        assert_eq!(x.row(0).to_vec(), vec![0.0, 0.0, 0.0, 1500.0, 0.0]);
    }

    #[test]
    fn test_missing_values_are_rejected() {
        let df = df![
            "income" => [Some(1.0), None],
            "status" => [true, false],
        ]
        .unwrap();
        let spec = FeaturePipelineSpec::from_frame(&df, "status").unwrap();

        let err = spec.fit(&df).unwrap_err();
        assert!(matches!(err, LearningError::InvalidData(_)));
    }

    #[test]
    fn test_missing_feature_column_is_schema_mismatch() {
        let fitted = FeaturePipelineSpec::from_frame(&sample(), "status")
            .unwrap()
            .fit(&sample())
            .unwrap();
        let df = df!["region" => ["south"], "status" => [true]].unwrap();

        let err = fitted.transform(&df).unwrap_err();
        assert!(matches!(err, LearningError::SchemaMismatch(_)));
    }

    #[test]
    fn test_labels_must_be_boolean() {
        let df = df!["income" => [1.0, 2.0], "status" => [1i64, 0]].unwrap();
        let err = extract_labels(&df, "status").unwrap_err();
        assert!(matches!(err, LearningError::InvalidData(_)));

        let labels = extract_labels(&sample(), "status").unwrap();
        assert_eq!(labels.to_vec(), vec![true, false, true, false]);
    }
}
