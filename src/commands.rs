//! Command implementations shared by the `schemalign`, `extract` and
//! `evaluate` binaries.

use crate::config::Config;
use crate::eval::{ClassificationMode, LlmCrossValidator};
use crate::llm::{ChatCompletionsClient, TokioSleeper};
use crate::pacing::{FixedIntervalPacer, NoPacing, Pacer};
use crate::pipeline::{run_evaluation, run_extraction, EvaluationReport, ExtractionSummary, MetricsSource};
use crate::report::format_comparison;
use anyhow::Result;
use clap::Args;
use std::time::Duration;

#[derive(Args, Debug, Clone, Default)]
pub struct ExtractArgs {
    /// Do not pause between batches of resolver calls
    #[arg(long)]
    pub no_pacing: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct EvaluateArgs {
    /// Override metrics.classification from the config file
    #[arg(long, value_enum)]
    pub classification: Option<ClassificationMode>,

    /// Skip the LLM cross-check and report the calculated metrics for both
    #[arg(long)]
    pub skip_llm: bool,
}

/// Build the chat client from config; fails when the API key is not set.
pub fn build_chat_client(config: &Config) -> Result<ChatCompletionsClient> {
    let api_key = config.api_key()?;
    Ok(ChatCompletionsClient::new(
        api_key,
        config.llm.base_url.clone(),
        Duration::from_secs(config.llm.timeout_secs),
    )?)
}

pub async fn extract(config: &Config, args: &ExtractArgs) -> Result<ExtractionSummary> {
    let client = build_chat_client(config)?;
    let sleeper = TokioSleeper;
    let fixed;
    let pacer: &dyn Pacer = if args.no_pacing {
        &NoPacing
    } else {
        fixed = FixedIntervalPacer::new(
            config.pacing.every,
            Duration::from_secs(config.pacing.pause_secs),
            &sleeper,
        );
        &fixed
    };

    let summary = run_extraction(config, &client, pacer).await?;
    log::info!(
        "Extraction complete: {} records, {} without SQL tables, {} without predictions",
        summary.records,
        summary.empty_ground_truth,
        summary.empty_predictions
    );
    Ok(summary)
}

pub async fn evaluate(config: &Config, args: &EvaluateArgs) -> Result<EvaluationReport> {
    let mode = args.classification.unwrap_or(config.metrics.classification);

    // a missing key only disables the cross-check; metrics still get computed
    let client = if args.skip_llm {
        None
    } else {
        match build_chat_client(config) {
            Ok(client) => Some(client),
            Err(e) => {
                log::warn!("LLM cross-check unavailable: {:#}", e);
                None
            }
        }
    };
    let sleeper = TokioSleeper;
    let validator = client.as_ref().map(|client| {
        LlmCrossValidator::new(
            client,
            config.llm.validator_model.clone(),
            config.retry_policy(),
            &sleeper,
        )
    });

    let report = run_evaluation(config, validator.as_ref(), mode).await?;
    print_evaluation(&report);
    Ok(report)
}

/// Console summary of an evaluation run.
pub fn print_evaluation(report: &EvaluationReport) {
    println!("\nResults comparison ({:?} classification, {} records):", report.mode, report.records);
    let llm = match report.llm_source {
        MetricsSource::Llm => Some(&report.llm),
        MetricsSource::LocalFallback => None,
    };
    print!("{}", format_comparison(&report.calculated, llm));
    if report.llm_source == MetricsSource::LocalFallback {
        println!("(LLM cross-check unavailable; calculated metrics were saved as the LLM result)");
    }
    println!(
        "\nTP={} FP={} FN={} | F1 computed for {} db_id(s)",
        report.counts.true_positive,
        report.counts.false_positive,
        report.counts.false_negative,
        report.f1_per_db.len()
    );
    if report.misaligned > 0 {
        println!("Warning: {} alignment problem(s) between ground truth and predictions", report.misaligned);
    }
}
