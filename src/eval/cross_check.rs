//! Cross-check of the metric arithmetic by a chat model.

use crate::error::{Result, SchemalignError};
use crate::eval::confusion::ConfusionCounts;
use crate::eval::metrics::MetricsResult;
use crate::llm::{call_with_backoff, ChatClient, RetryPolicy, Sleeper};

/// Asks a chat model to derive precision/recall/F1 from aggregate counts.
pub struct LlmCrossValidator<'a> {
    client: &'a dyn ChatClient,
    model: String,
    policy: RetryPolicy,
    sleeper: &'a dyn Sleeper,
}

impl<'a> LlmCrossValidator<'a> {
    pub fn new(
        client: &'a dyn ChatClient,
        model: impl Into<String>,
        policy: RetryPolicy,
        sleeper: &'a dyn Sleeper,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            policy,
            sleeper,
        }
    }

    /// Request the metrics, retrying rate limits and transient failures.
    ///
    /// Errors propagate: exhausted retries, fatal API errors and unparseable
    /// answers all surface to the caller, which owns the fallback.
    pub async fn compute(&self, counts: &ConfusionCounts, total_records: usize) -> Result<MetricsResult> {
        let prompt = build_prompt(counts, total_records);
        let client = self.client;
        let model = self.model.as_str();
        let prompt = prompt.as_str();

        let response = call_with_backoff(&self.policy, self.sleeper, SchemalignError::is_retryable, move |_| {
            client.complete(model, prompt)
        })
        .await?;

        parse_metrics_response(&response)
    }
}

pub fn build_prompt(counts: &ConfusionCounts, total_records: usize) -> String {
    format!(
        r#"Given these aggregate numbers calculated on a complete dataset of {} records:
- True Positives (TP): {}
- False Positives (FP): {}
- False Negatives (FN): {}

Calculate precision, recall and F1 score

Return ONLY a JSON object with the calculated numerical results:
{{
    "precision": value,
    "recall": value,
    "f1_score": value
}}"#,
        total_records, counts.true_positive, counts.false_positive, counts.false_negative
    )
}

/// Parse the metrics object out of a model answer, unwrapping a code fence
/// (```` ```json ```` or bare ```` ``` ````) or surrounding prose if present.
pub fn parse_metrics_response(response: &str) -> Result<MetricsResult> {
    let text = response.trim();
    let body = if let Some((_, rest)) = text.split_once("```json") {
        rest.split("```").next().unwrap_or(rest)
    } else if text.contains("```") {
        text.split("```").nth(1).unwrap_or(text)
    } else {
        text
    };
    let body = body.trim();

    match serde_json::from_str::<MetricsResult>(body) {
        Ok(metrics) => Ok(metrics),
        Err(first_err) => {
            // prose around a bare object: "Here are the results: { ... }"
            let embedded = match (body.find('{'), body.rfind('}')) {
                (Some(start), Some(end)) if start < end => Some(&body[start..=end]),
                _ => None,
            };
            embedded
                .and_then(|json| serde_json::from_str::<MetricsResult>(json).ok())
                .ok_or_else(|| {
                    SchemalignError::Parse(format!(
                        "Model answer is not a metrics object ({}): {}",
                        first_err, body
                    ))
                })
        }
    }
}

/// One metric as computed locally and by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDelta {
    pub metric: &'static str,
    pub local: f64,
    pub llm: f64,
}

impl MetricDelta {
    pub fn delta(&self) -> f64 {
        (self.local - self.llm).abs()
    }
}

/// Compare both results; deltas above `tolerance` are logged as warnings.
pub fn reconcile(local: &MetricsResult, llm: &MetricsResult, tolerance: f64) -> Vec<MetricDelta> {
    local
        .named()
        .into_iter()
        .zip(llm.named())
        .map(|((metric, local), (_, llm))| {
            let delta = MetricDelta { metric, local, llm };
            if delta.delta() > tolerance {
                log::warn!(
                    "{} disagrees: calculated {:.4}, LLM {:.4} (|delta| {:.4} > {})",
                    metric,
                    local,
                    llm,
                    delta.delta(),
                    tolerance
                );
            }
            delta
        })
        .collect()
}
