//! Evaluation metrics: precision, recall and F1 from confusion counts.

use crate::dataset::TableSet;
use crate::eval::confusion::{calculate_tp_fp_fn_with, ClassificationMode, ConfusionCounts};
use serde::{Deserialize, Serialize};

/// Precision, recall and F1, each in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

impl MetricsResult {
    /// Derive the three scores. Every zero denominator yields 0.0, never NaN.
    pub fn from_counts(counts: &ConfusionCounts) -> Self {
        let tp = counts.true_positive as f64;
        let precision = ratio(tp, tp + counts.false_positive as f64);
        let recall = ratio(tp, tp + counts.false_negative as f64);
        let f1_score = ratio(2.0 * precision * recall, precision + recall);
        Self {
            precision,
            recall,
            f1_score,
        }
    }

    /// (name, value) pairs in report order.
    pub fn named(&self) -> [(&'static str, f64); 3] {
        [
            ("precision", self.precision),
            ("recall", self.recall),
            ("f1_score", self.f1_score),
        ]
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Metrics over positionally paired ground truth and predictions (leaky mode).
pub fn calculate_metrics(real_values: &[TableSet], predicted_values: &[TableSet]) -> MetricsResult {
    calculate_metrics_with(real_values, predicted_values, ClassificationMode::Leaky)
}

pub fn calculate_metrics_with(
    real_values: &[TableSet],
    predicted_values: &[TableSet],
    mode: ClassificationMode,
) -> MetricsResult {
    MetricsResult::from_counts(&calculate_tp_fp_fn_with(real_values, predicted_values, mode))
}
