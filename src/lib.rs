pub mod commands;
pub mod config;
pub mod dataset;
pub mod error;
pub mod eval;
pub mod extract;
pub mod llm;
pub mod pacing;
pub mod pipeline;
pub mod report;
pub mod resolver;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use error::{Result, SchemalignError};
pub use eval::{calculate_metrics, calculate_tp_fp_fn, ClassificationMode, MetricsResult};
pub use extract::extract_tables;
