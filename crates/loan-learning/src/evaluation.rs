//! Binary classification metrics.
//!
//! Scores come from `linfa`'s confusion matrix. [`ConfusionMatrix`] keeps the
//! raw counts behind the printed table.

use crate::error::{LearningError, Result};
use linfa::metrics::ToConfusionMatrix;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Class indices handed to linfa. Binary scores refer to the lowest index.
const APPROVED: usize = 0;
const REJECTED: usize = 1;

fn class_index(label: &bool) -> usize {
    if *label { APPROVED } else { REJECTED }
}

/// Counts of predicted vs. actual outcomes on a test table.
///
/// The `Display` impl renders the familiar text table:
///
/// ```text
/// TEST POSITIVE RATIO:    0.5000 (2/(2+2))
/// Confusion table
///           ||======================
/// PREDICTED || positive | negative | Recall
/// TRUTH     ||======================
///  positive ||        1 |        1 | 0.5000
///  negative ||        0 |        2 | 1.0000
///           ||======================
/// Precision ||   1.0000 |   0.6667 |
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    /// Tally `actual` against `predicted`. Extra elements in the longer view are ignored.
    pub fn from_predictions(actual: ArrayView1<'_, bool>, predicted: ArrayView1<'_, bool>) -> Self {
        let mut matrix = Self::default();
        for (truth, guess) in actual.iter().zip(predicted.iter()) {
            match (*truth, *guess) {
                (true, true) => matrix.true_positives += 1,
                (false, false) => matrix.true_negatives += 1,
                (false, true) => matrix.false_positives += 1,
                (true, false) => matrix.false_negatives += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    pub fn actual_positives(&self) -> usize {
        self.true_positives + self.false_negatives
    }

    pub fn actual_negatives(&self) -> usize {
        self.true_negatives + self.false_positives
    }

    /// Fraction of correct predictions; 0.0 for an empty matrix.
    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.actual_positives())
    }

    pub fn negative_precision(&self) -> f64 {
        ratio(self.true_negatives, self.true_negatives + self.false_negatives)
    }

    pub fn negative_recall(&self) -> f64 {
        ratio(self.true_negatives, self.actual_negatives())
    }

    fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let positives = self.actual_positives();
        let negatives = self.actual_negatives();

        writeln!(
            f,
            "TEST POSITIVE RATIO:\t{:.4} ({}/({}+{}))",
            ratio(positives, self.total()),
            positives,
            positives,
            negatives
        )?;
        writeln!(f, "Confusion table")?;
        writeln!(f, "          ||======================")?;
        writeln!(f, "PREDICTED || positive | negative | Recall")?;
        writeln!(f, "TRUTH     ||======================")?;
        writeln!(
            f,
            " positive || {:>8} | {:>8} | {:.4}",
            self.true_positives,
            self.false_negatives,
            self.recall()
        )?;
        writeln!(
            f,
            " negative || {:>8} | {:>8} | {:.4}",
            self.false_positives,
            self.true_negatives,
            self.negative_recall()
        )?;
        writeln!(f, "          ||======================")?;
        writeln!(
            f,
            "Precision || {:>8.4} | {:>8.4} |",
            self.precision(),
            self.negative_precision()
        )
    }
}

/// Metrics reported after training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub confusion_matrix: ConfusionMatrix,
}

impl BinaryClassificationMetrics {
    /// Score `predicted` against `actual`, row by row.
    pub fn from_predictions(
        actual: ArrayView1<'_, bool>,
        predicted: ArrayView1<'_, bool>,
    ) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(LearningError::InvalidData(format!(
                "{} predictions for {} labelled rows",
                predicted.len(),
                actual.len()
            )));
        }
        let confusion_matrix = ConfusionMatrix::from_predictions(actual, predicted);

        // linfa only indexes classes present in the ground truth
        if confusion_matrix.actual_positives() == 0 || confusion_matrix.actual_negatives() == 0 {
            return Ok(Self {
                accuracy: confusion_matrix.accuracy(),
                precision: confusion_matrix.precision(),
                recall: confusion_matrix.recall(),
                f1: confusion_matrix.f1(),
                confusion_matrix,
            });
        }

        let truth: Array1<usize> = actual.map(class_index);
        let guesses: Array1<usize> = predicted.map(class_index);
        let scores = guesses
            .confusion_matrix(&truth)
            .map_err(|e| LearningError::InvalidData(e.to_string()))?;

        Ok(Self {
            accuracy: score(scores.accuracy()),
            precision: score(scores.precision()),
            recall: score(scores.recall()),
            f1: score(scores.f1_score()),
            confusion_matrix,
        })
    }
}

/// linfa yields NaN for an empty denominator.
fn score(value: f32) -> f64 {
    if value.is_finite() { f64::from(value) } else { 0.0 }
}
