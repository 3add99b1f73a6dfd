//! loan-learning: logistic regression training for the loan approval pipeline.
//!
//! Takes the cleaned, split tables produced by `loan-processing`, turns them
//! into dense feature matrices and fits an LBFGS logistic regression with
//! `linfa-logistic`.
//!
//! # Features
//!
//! - **Feature Pipeline**: one-hot encoding of categorical columns, concatenation,
//!   mean/variance normalization learned from the training rows
//! - **Training**: L2-regularized logistic regression behind the [`LearningBackend`] trait
//! - **Evaluation**: accuracy, precision, recall, F1 and a printable confusion table
//! - **Persistence**: JSON artifact holding the model and its input schema
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use loan_learning::{
//!     FeaturePipelineSpec, LearningBackend, LogisticRegressionBackend, ModelSchema,
//!     TrainingConfig,
//! };
//!
//! let backend = LogisticRegressionBackend::new(TrainingConfig::default())?;
//! let spec = FeaturePipelineSpec::from_frame(&train, "status")?;
//!
//! let model = backend.fit(&spec, &train)?;
//! let metrics = backend.evaluate(&model, &test, "status")?;
//! println!("Model trained with accuracy: {}", metrics.accuracy);
//! println!("{}", metrics.confusion_matrix);
//!
//! let schema = ModelSchema::from_frame(&cleaned, "status")?;
//! backend.save(&model, &schema, "model.json".as_ref())?;
//! ```
//!
//! # Architecture
//!
//! ```text
//!  train ─► FeaturePipelineSpec::fit ─► FittedFeaturePipeline ─┐
//!                                                             ├─► TrainedModel ─► ModelArtifact
//!  train ─► LogisticRegression (LBFGS) ─► FittedLogistic... ───┘
//!                                                │
//!  test  ────────────────────────────────────────┴─► ConfusionMatrix / metrics
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod features;
pub mod model;

pub use backend::{LearningBackend, LogisticRegressionBackend};
pub use config::{TrainingConfig, TrainingConfigBuilder};
pub use error::{LearningError, Result};
pub use evaluation::{BinaryClassificationMetrics, ConfusionMatrix};
pub use features::{
    ColumnEncoder, FeatureColumn, FeatureKind, FeaturePipelineSpec, FittedFeaturePipeline,
    StandardScaler,
};
pub use model::{ARTIFACT_FORMAT_VERSION, ModelArtifact, ModelSchema, SchemaColumn, TrainedModel};
