//! Trained model and its on-disk artifact.
//!
//! A [`TrainedModel`] bundles the fitted feature pipeline with the fitted
//! logistic regression, so raw cleaned tables go straight in. The
//! [`ModelArtifact`] wraps it with the input [`ModelSchema`] and is written as
//! pretty-printed JSON:
//!
//! ```text
//! {
//!   "format_version": 1,
//!   "created_at": "2026-01-01T12:00:00+00:00",
//!   "schema": { "label_column": "status", "columns": [ ... ] },
//!   "model": { "pipeline": { ... }, "classifier": { ... } }
//! }
//! ```

use crate::error::{LearningError, Result};
use crate::evaluation::BinaryClassificationMetrics;
use crate::features::{FittedFeaturePipeline, extract_labels};
use linfa::prelude::*;
use linfa_logistic::FittedLogisticRegression;
use ndarray::Array1;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Version written into every artifact. Loading rejects other versions.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Fitted feature pipeline plus fitted classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pipeline: FittedFeaturePipeline,
    classifier: FittedLogisticRegression<f64, bool>,
}

static_assertions::assert_impl_all!(TrainedModel: Send, Sync);

impl TrainedModel {
    pub fn new(
        pipeline: FittedFeaturePipeline,
        classifier: FittedLogisticRegression<f64, bool>,
    ) -> Self {
        Self {
            pipeline,
            classifier,
        }
    }

    pub fn pipeline(&self) -> &FittedFeaturePipeline {
        &self.pipeline
    }

    /// Learned weights, one per feature in [`FittedFeaturePipeline::feature_names`] order.
    pub fn coefficients(&self) -> Vec<f64> {
        self.classifier.params().to_vec()
    }

    pub fn intercept(&self) -> f64 {
        self.classifier.intercept()
    }

    /// Predicted approval for every row of `df`.
    pub fn predict(&self, df: &DataFrame) -> Result<Array1<bool>> {
        let x = self.transform(df)?;
        Ok(self.classifier.predict(&x))
    }

    /// Probability that each row of `df` is approved.
    pub fn predict_proba(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let x = self.transform(df)?;
        let positive = self.classifier.predict_probabilities(&x);
        // The fitted labels decide which class the probabilities refer to
        if self.classifier.labels().pos.class {
            Ok(positive)
        } else {
            Ok(positive.mapv(|p| 1.0 - p))
        }
    }

    /// Score the model on `test`, which must carry the training label column.
    pub fn evaluate(&self, test: &DataFrame) -> Result<BinaryClassificationMetrics> {
        self.evaluate_against(test, self.pipeline.label_column())
    }

    /// Score the model on `test` using `label_column` as ground truth.
    pub fn evaluate_against(
        &self,
        test: &DataFrame,
        label_column: &str,
    ) -> Result<BinaryClassificationMetrics> {
        if test.height() == 0 {
            return Err(LearningError::InvalidData(
                "cannot evaluate on an empty table".to_string(),
            ));
        }
        let actual = extract_labels(test, label_column)?;
        let predicted = self.predict(test)?;
        BinaryClassificationMetrics::from_predictions(actual.view(), predicted.view())
    }

    fn transform(&self, df: &DataFrame) -> Result<ndarray::Array2<f64>> {
        self.pipeline
            .transform(df)
            .map_err(|e| LearningError::InferenceError(e.to_string()))
    }
}

/// One input column as seen at training time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaColumn {
    pub name: String,
    pub dtype: String,
}

/// Input schema the model was trained on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSchema {
    pub label_column: String,
    pub columns: Vec<SchemaColumn>,
}

impl ModelSchema {
    pub fn from_frame(df: &DataFrame, label_column: &str) -> Result<Self> {
        if df.column(label_column).is_err() {
            return Err(LearningError::LabelNotFound(label_column.to_string()));
        }
        let columns = df
            .get_columns()
            .iter()
            .map(|c| SchemaColumn {
                name: c.name().to_string(),
                dtype: c.dtype().to_string(),
            })
            .collect();
        Ok(Self {
            label_column: label_column.to_string(),
            columns,
        })
    }

    /// Check that `df` has every schema column (label excluded) with the same dtype.
    pub fn check(&self, df: &DataFrame) -> Result<()> {
        for expected in self.columns.iter().filter(|c| c.name != self.label_column) {
            let column = df.column(&expected.name).map_err(|_| {
                LearningError::SchemaMismatch(format!("column '{}' is missing", expected.name))
            })?;
            let found = column.dtype().to_string();
            if found != expected.dtype {
                return Err(LearningError::SchemaMismatch(format!(
                    "column '{}' has dtype {}, expected {}",
                    expected.name, found, expected.dtype
                )));
            }
        }
        Ok(())
    }
}

/// Model plus schema, as persisted to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub created_at: String,
    pub schema: ModelSchema,
    pub model: TrainedModel,
}

impl ModelArtifact {
    pub fn new(schema: ModelSchema, model: TrainedModel) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            created_at: chrono::Utc::now().to_rfc3339(),
            schema,
            model,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Write the artifact to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        fs::write(path, &bytes).map_err(|source| LearningError::SaveFailed {
            path: path.display().to_string(),
            source,
        })?;
        info!("Saved model artifact ({} bytes) to {}", bytes.len(), path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LearningError::ModelNotFound {
                path: path.display().to_string(),
            });
        }
        let artifact: Self = serde_json::from_slice(&fs::read(path)?)?;
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(LearningError::InvalidData(format!(
                "unsupported artifact format version {} (expected {})",
                artifact.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }
        Ok(artifact)
    }

    /// Check `df` against the stored schema, then predict.
    pub fn predict(&self, df: &DataFrame) -> Result<Array1<bool>> {
        self.schema.check(df)?;
        self.model.predict(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{LearningBackend, LogisticRegressionBackend};
    use crate::features::FeaturePipelineSpec;
    use polars::prelude::*;

    fn table() -> DataFrame {
        df![
            "income" => [1.0, 2.0, 3.0, 4.0, 10.0, 11.0, 12.0, 13.0],
            "region" => ["a", "b", "a", "b", "a", "b", "a", "b"],
            "status" => [false, false, false, false, true, true, true, true],
        ]
        .unwrap()
    }

    fn trained() -> TrainedModel {
        let df = table();
        let spec = FeaturePipelineSpec::from_frame(&df, "status").unwrap();
        LogisticRegressionBackend::default().fit(&spec, &df).unwrap()
    }

    #[test]
    fn test_probabilities_follow_predictions() {
        let model = trained();
        let df = table();

        let predicted = model.predict(&df).unwrap();
        let proba = model.predict_proba(&df).unwrap();

        for (label, p) in predicted.iter().zip(proba.iter()) {
            assert!((0.0..=1.0).contains(p));
            assert_eq!(*label, *p >= 0.5);
        }
        assert_eq!(model.coefficients().len(), 3);
    }

    #[test]
    fn test_schema_check() {
        let schema = ModelSchema::from_frame(&table(), "status").unwrap();
        assert_eq!(schema.columns.len(), 3);

        let renamed = df!["salary" => [1.0], "region" => ["a"]].unwrap();
        let err = schema.check(&renamed).unwrap_err();
        assert!(matches!(err, LearningError::SchemaMismatch(_)));

        let retyped = df!["income" => ["high"], "region" => ["a"]].unwrap();
        assert!(schema.check(&retyped).is_err());

        // Label is not needed for prediction
        let unlabeled = df!["income" => [1.0], "region" => ["a"]].unwrap();
        assert!(schema.check(&unlabeled).is_ok());
    }

    #[test]
    fn test_artifact_bytes_are_json() {
        let artifact = ModelArtifact::new(
            ModelSchema::from_frame(&table(), "status").unwrap(),
            trained(),
        );
        let value: serde_json::Value =
            serde_json::from_slice(&artifact.to_bytes().unwrap()).unwrap();

        assert_eq!(value["format_version"], 1);
        assert_eq!(value["schema"]["label_column"], "status");
        assert!(value["model"]["pipeline"].is_object());
    }

    #[test]
    fn test_load_missing_artifact() {
        let err = ModelArtifact::load("/definitely/not/here/model.json").unwrap_err();
        assert_eq!(err.error_code(), "MODEL_NOT_FOUND");
    }
}
