//! Evaluation framework: TP/FP/FN classification, precision/recall/F1,
//! per-database F1 and the LLM cross-check of the arithmetic.

pub mod confusion;
pub mod cross_check;
pub mod grouped;
pub mod metrics;

pub use confusion::{calculate_tp_fp_fn, calculate_tp_fp_fn_with, ClassificationMode, ConfusionCounts};
pub use cross_check::{reconcile, LlmCrossValidator, MetricDelta};
pub use grouped::{calculate_metrics_per_db, check_alignment, flatten_tables, group_by_db, GroupedTableSets};
pub use metrics::{calculate_metrics, calculate_metrics_with, MetricsResult};
