use crate::config::Config;
use crate::dataset::{load_json, write_json, TableSet, TablesEntry};
use crate::error::Result;
use crate::eval::{
    calculate_metrics_per_db, calculate_tp_fp_fn_with, check_alignment, flatten_tables, group_by_db,
    reconcile, ClassificationMode, ConfusionCounts, LlmCrossValidator, MetricDelta, MetricsResult,
};
use crate::report::write_f1_chart;
use serde::Serialize;
use std::collections::BTreeMap;

/// Where the "LLM" metrics finally came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsSource {
    Llm,
    /// The cross-check failed or was skipped; local metrics were substituted.
    LocalFallback,
}

/// Everything an evaluation run computed.
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub mode: ClassificationMode,
    pub records: usize,
    pub counts: ConfusionCounts,
    pub calculated: MetricsResult,
    pub llm: MetricsResult,
    pub llm_source: MetricsSource,
    pub deltas: Vec<MetricDelta>,
    pub f1_per_db: BTreeMap<String, f64>,
    /// Alignment problems between the two artifacts (0 when aligned).
    pub misaligned: usize,
}

/// Ask the validator for metrics; on any failure (or no validator) substitute
/// the locally computed ones and log the substitution.
pub async fn cross_validate_or_fallback(
    validator: Option<&LlmCrossValidator<'_>>,
    counts: &ConfusionCounts,
    total_records: usize,
) -> (MetricsResult, MetricsSource) {
    let local = MetricsResult::from_counts(counts);
    let Some(validator) = validator else {
        log::warn!("LLM cross-check skipped, using calculated metrics");
        return (local, MetricsSource::LocalFallback);
    };
    match validator.compute(counts, total_records).await {
        Ok(metrics) => (metrics, MetricsSource::Llm),
        Err(e) => {
            log::warn!("Error calculating metrics with LLM: {}. Falling back to calculated metrics", e);
            (local, MetricsSource::LocalFallback)
        }
    }
}

/// Full evaluation run over the two extraction artifacts.
///
/// Writes `evaluation_results.json`, `llm_evaluation_results.json`,
/// `f1_per_db.json` and the F1 chart under the metrics directory.
pub async fn run_evaluation(
    config: &Config,
    validator: Option<&LlmCrossValidator<'_>>,
    mode: ClassificationMode,
) -> Result<EvaluationReport> {
    let ground_truth: Vec<TablesEntry> = load_json(&config.output_sql_path())?;
    let predictions: Vec<TablesEntry> = load_json(&config.output_llm_path())?;
    log::info!(
        "Loaded {} ground-truth and {} prediction records ({:?} classification)",
        ground_truth.len(),
        predictions.len(),
        mode
    );
    let misaligned = check_alignment(&ground_truth, &predictions);

    let real_values: Vec<TableSet> = flatten_tables(&ground_truth);
    let predicted_values: Vec<TableSet> = flatten_tables(&predictions);

    let counts = calculate_tp_fp_fn_with(&real_values, &predicted_values, mode);
    let calculated = MetricsResult::from_counts(&counts);
    log::info!(
        "TP={} FP={} FN={}",
        counts.true_positive,
        counts.false_positive,
        counts.false_negative
    );

    let results_path = config.evaluation_results_path();
    write_json(&results_path, &calculated)?;
    log::info!("Calculated results saved to {}", results_path.display());

    let (llm, llm_source) = cross_validate_or_fallback(validator, &counts, real_values.len()).await;
    let llm_path = config.llm_evaluation_results_path();
    write_json(&llm_path, &llm)?;
    log::info!("LLM results saved to {}", llm_path.display());

    let deltas = reconcile(&calculated, &llm, config.metrics.tolerance);

    let f1_per_db = calculate_metrics_per_db(&group_by_db(&ground_truth), &group_by_db(&predictions), mode);
    let f1_path = config.f1_per_db_path();
    write_json(&f1_path, &f1_per_db)?;
    log::info!("F1 for each db_id saved to {}", f1_path.display());

    write_f1_chart(&f1_per_db, &config.chart_path())?;

    Ok(EvaluationReport {
        mode,
        records: real_values.len(),
        counts,
        calculated,
        llm,
        llm_source,
        deltas,
        f1_per_db,
        misaligned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemalignError;
    use crate::eval::calculate_metrics;
    use crate::llm::RetryPolicy;
    use crate::test_support::{RecordingSleeper, ScriptedChatClient};
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;

    fn sets(rows: &[&[&str]]) -> Vec<TableSet> {
        rows.iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    fn config_in(temp_dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.paths.tables_dir = temp_dir.path().join("tables");
        config.paths.metrics_dir = temp_dir.path().join("metrics");
        config
    }

    fn write_artifacts(config: &Config) {
        let sql = json!([
            {"question_id": 0, "db_id": "financial", "query": "q", "tables_extracted": ["loan"]},
            {"question_id": 1, "db_id": "financial", "query": "q", "tables_extracted": ["account"]},
            {"question_id": 2, "db_id": "schools", "query": "q", "tables_extracted": ["schools"]},
            {"question_id": 3, "db_id": "only_truth", "query": "q", "tables_extracted": ["x"]}
        ]);
        let llm = json!([
            {"question_id": 0, "db_id": "financial", "question": "q", "tables_extracted": ["loan"]},
            {"question_id": 1, "db_id": "financial", "question": "q", "tables_extracted": ["loan"]},
            {"question_id": 2, "db_id": "schools", "question": "q", "tables_extracted": ["schools", "frpm"]},
            {"question_id": 3, "db_id": "only_predictions", "question": "q", "tables_extracted": ["x"]}
        ]);
        write_json(&config.output_sql_path(), &sql).unwrap();
        write_json(&config.output_llm_path(), &llm).unwrap();
    }

    #[tokio::test]
    async fn fallback_after_exhaustion_equals_local_metrics() {
        let real = sets(&[&["a"], &["b"]]);
        let predicted = sets(&[&["a"], &["a", "c"]]);
        let counts = calculate_tp_fp_fn_with(&real, &predicted, ClassificationMode::Leaky);

        let client = ScriptedChatClient::new(
            (0..4)
                .map(|_| Err(SchemalignError::RateLimited("429".to_string())))
                .collect(),
        );
        let sleeper = RecordingSleeper::default();
        let validator = LlmCrossValidator::new(&client, "m", RetryPolicy::new(3, Duration::from_secs(2)), &sleeper);

        let (metrics, source) = cross_validate_or_fallback(Some(&validator), &counts, real.len()).await;
        assert_eq!(source, MetricsSource::LocalFallback);
        assert_eq!(metrics, calculate_metrics(&real, &predicted));
        assert_eq!(client.calls(), 4);
        assert_eq!(
            sleeper.recorded(),
            vec![Duration::from_secs(2), Duration::from_secs(4), Duration::from_secs(8)]
        );
    }

    #[tokio::test]
    async fn malformed_answer_falls_back() {
        let counts = ConfusionCounts {
            true_positive: 2,
            false_positive: 0,
            false_negative: 0,
        };
        let client = ScriptedChatClient::always("precision=1", 1);
        let sleeper = RecordingSleeper::default();
        let validator = LlmCrossValidator::new(&client, "m", RetryPolicy::default(), &sleeper);
        let (metrics, source) = cross_validate_or_fallback(Some(&validator), &counts, 1).await;
        assert_eq!(source, MetricsSource::LocalFallback);
        assert_eq!(metrics.f1_score, 1.0);
    }

    #[tokio::test]
    async fn no_validator_falls_back() {
        let (metrics, source) = cross_validate_or_fallback(None, &ConfusionCounts::default(), 0).await;
        assert_eq!(source, MetricsSource::LocalFallback);
        assert_eq!(metrics, MetricsResult::default());
    }

    #[tokio::test]
    async fn run_writes_all_outputs() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir);
        write_artifacts(&config);

        let client = ScriptedChatClient::always(
            r#"```json
{"precision": 0.6, "recall": 0.75, "f1_score": 0.6667}
```"#,
            1,
        );
        let sleeper = RecordingSleeper::default();
        let validator = LlmCrossValidator::new(&client, "m", RetryPolicy::default(), &sleeper);

        let report = run_evaluation(&config, Some(&validator), ClassificationMode::Leaky)
            .await
            .unwrap();

        // record 1 predicts record 0's "loan" (FN), record 2 adds unknown "frpm" (FP)
        assert_eq!(
            report.counts,
            ConfusionCounts {
                true_positive: 3,
                false_positive: 1,
                false_negative: 1
            }
        );
        assert_eq!(report.llm_source, MetricsSource::Llm);
        assert_eq!(report.records, 4);
        assert_eq!(report.misaligned, 0);
        assert_eq!(report.deltas.len(), 3);

        let f1: BTreeMap<String, f64> = load_json(&config.f1_per_db_path()).unwrap();
        assert_eq!(f1.keys().collect::<Vec<_>>(), vec!["financial", "schools"]);
        assert!(f1["financial"] > 0.0);

        let calculated: MetricsResult = load_json(&config.evaluation_results_path()).unwrap();
        assert_eq!(calculated, report.calculated);
        let llm: MetricsResult = load_json(&config.llm_evaluation_results_path()).unwrap();
        assert!((llm.recall - 0.75).abs() < 1e-9);
        assert!(config.chart_path().exists());
    }

    #[tokio::test]
    async fn standard_mode_changes_counts() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir);
        write_artifacts(&config);

        let report = run_evaluation(&config, None, ClassificationMode::Standard)
            .await
            .unwrap();
        assert_eq!(report.counts.false_negative, 0);
        assert_eq!(report.counts.false_positive, 2);
        assert_eq!(report.llm_source, MetricsSource::LocalFallback);
        assert_eq!(report.llm, report.calculated);
    }

    #[tokio::test]
    async fn missing_artifacts_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir);
        assert!(run_evaluation(&config, None, ClassificationMode::Leaky).await.is_err());
    }
}
