//! Training backends.
//!
//! [`LearningBackend`] is the seam between the CLI flow and the classifier
//! implementation: fit a model from a declared feature pipeline, evaluate it
//! on held-out rows and persist it. [`LogisticRegressionBackend`] is the
//! LBFGS logistic regression implementation on top of `linfa-logistic`.

use crate::config::TrainingConfig;
use crate::error::{LearningError, Result};
use crate::evaluation::BinaryClassificationMetrics;
use crate::features::FeaturePipelineSpec;
use crate::model::{ModelArtifact, ModelSchema, TrainedModel};
use linfa::prelude::*;
use linfa_logistic::LogisticRegression;
use polars::prelude::DataFrame;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Fit, evaluate and persist a binary classifier.
pub trait LearningBackend {
    type Model;

    /// Fit the feature pipeline and the classifier on `train`.
    ///
    /// The spec must target the label column the backend was configured with.
    fn fit(&self, spec: &FeaturePipelineSpec, train: &DataFrame) -> Result<Self::Model>;

    /// Score `model` on `test`, comparing predictions with `label_column`.
    fn evaluate(
        &self,
        model: &Self::Model,
        test: &DataFrame,
        label_column: &str,
    ) -> Result<BinaryClassificationMetrics>;

    /// Write `model` together with the input `schema` to `path`, replacing any existing file.
    fn save(&self, model: &Self::Model, schema: &ModelSchema, path: &Path) -> Result<()>;
}

/// LBFGS logistic regression with L2 regularization.
#[derive(Debug, Clone, Default)]
pub struct LogisticRegressionBackend {
    config: TrainingConfig,
}

impl LogisticRegressionBackend {
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }
}

impl LearningBackend for LogisticRegressionBackend {
    type Model = TrainedModel;

    fn fit(&self, spec: &FeaturePipelineSpec, train: &DataFrame) -> Result<TrainedModel> {
        if spec.label_column != self.config.label_column {
            return Err(LearningError::InvalidConfig(format!(
                "feature pipeline predicts '{}' but the trainer is configured for '{}'",
                spec.label_column, self.config.label_column
            )));
        }

        let start = Instant::now();

        let pipeline = spec
            .fit(train)
            .map_err(|e| LearningError::TrainingFailed(format!("feature pipeline: {}", e)))?;
        let records = pipeline.transform(train)?;
        let targets = pipeline.labels(train)?;

        let positives = targets.iter().filter(|v| **v).count();
        if positives == 0 || positives == targets.len() {
            return Err(LearningError::TrainingFailed(format!(
                "the training rows contain a single label class ({} of {} positive)",
                positives,
                targets.len()
            )));
        }

        debug!(
            "Fitting logistic regression on {} rows x {} features",
            records.nrows(),
            records.ncols()
        );

        let dataset = Dataset::new(records, targets);
        let classifier = LogisticRegression::default()
            .max_iterations(self.config.max_iterations)
            .gradient_tolerance(self.config.gradient_tolerance)
            .alpha(self.config.alpha)
            .with_intercept(self.config.with_intercept)
            .fit(&dataset)
            .map_err(|e| LearningError::TrainingFailed(e.to_string()))?;

        info!(
            "Trained logistic regression on {} rows in {} ms",
            train.height(),
            start.elapsed().as_millis()
        );

        Ok(TrainedModel::new(pipeline, classifier))
    }

    fn evaluate(
        &self,
        model: &TrainedModel,
        test: &DataFrame,
        label_column: &str,
    ) -> Result<BinaryClassificationMetrics> {
        model.evaluate_against(test, label_column)
    }

    fn save(&self, model: &TrainedModel, schema: &ModelSchema, path: &Path) -> Result<()> {
        ModelArtifact::new(schema.clone(), model.clone()).save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn separable() -> DataFrame {
        df![
            "income" => [1.0, 2.0, 3.0, 4.0, 10.0, 11.0, 12.0, 13.0],
            "region" => ["a", "a", "b", "a", "b", "b", "a", "b"],
            "status" => [false, false, false, false, true, true, true, true],
        ]
        .unwrap()
    }

    #[test]
    fn test_fit_and_evaluate_separable_data() {
        let backend = LogisticRegressionBackend::default();
        let df = separable();
        let spec = FeaturePipelineSpec::from_frame(&df, "status").unwrap();

        let model = backend.fit(&spec, &df).unwrap();
        let metrics = backend.evaluate(&model, &df, "status").unwrap();

        assert_eq!(metrics.accuracy, 1.0);
        assert_eq!(metrics.confusion_matrix.total(), 8);
    }

    #[test]
    fn test_single_class_fails() {
        let df = df![
            "income" => [1.0, 2.0, 3.0],
            "status" => [true, true, true],
        ]
        .unwrap();
        let spec = FeaturePipelineSpec::from_frame(&df, "status").unwrap();

        let err = LogisticRegressionBackend::default().fit(&spec, &df).unwrap_err();
        assert_eq!(err.error_code(), "TRAINING_FAILED");
    }

    #[test]
    fn test_missing_values_fail_training() {
        let df = df![
            "income" => [Some(1.0), None, Some(3.0), Some(4.0)],
            "status" => [true, false, true, false],
        ]
        .unwrap();
        let spec = FeaturePipelineSpec::from_frame(&df, "status").unwrap();

        let err = LogisticRegressionBackend::default().fit(&spec, &df).unwrap_err();
        assert!(matches!(err, LearningError::TrainingFailed(_)));
    }

    #[test]
    fn test_label_mismatch_rejected() {
        let mut df = separable();
        df.rename("status", "approved".into()).unwrap();
        let spec = FeaturePipelineSpec::from_frame(&df, "approved").unwrap();

        let err = LogisticRegressionBackend::default().fit(&spec, &df).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");

        let config = TrainingConfig::builder().label_column("approved").build().unwrap();
        let backend = LogisticRegressionBackend::new(config).unwrap();
        assert!(backend.fit(&spec, &df).is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TrainingConfig {
            max_iterations: 0,
            ..TrainingConfig::default()
        };
        assert!(LogisticRegressionBackend::new(config).is_err());
    }
}
