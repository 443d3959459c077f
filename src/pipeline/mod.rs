//! The two batch pipelines: extraction (ground truth + predictions) and
//! evaluation (metrics, cross-check, reports).

pub mod evaluation;
pub mod extraction;

pub use evaluation::{cross_validate_or_fallback, run_evaluation, EvaluationReport, MetricsSource};
pub use extraction::{extract_ground_truth, predict_tables, run_extraction, ExtractionSummary};
