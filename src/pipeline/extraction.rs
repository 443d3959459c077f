use crate::config::Config;
use crate::dataset::{load_records, write_json, PredictionEntry, Record, SqlTablesEntry, TableSet};
use crate::error::Result;
use crate::extract::{candidate_vocabulary, extract_tables};
use crate::llm::ChatClient;
use crate::pacing::Pacer;
use crate::resolver::EntityResolver;

/// Counts reported after an extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub records: usize,
    /// Records whose SQL yielded no table at all.
    pub empty_ground_truth: usize,
    /// Records for which the resolver returned nothing (including failed calls).
    pub empty_predictions: usize,
}

/// Ground-truth table sets for every record, in input order.
pub fn extract_ground_truth(records: &[Record]) -> Vec<SqlTablesEntry> {
    records
        .iter()
        .map(|record| SqlTablesEntry {
            question_id: record.question_id.clone(),
            db_id: record.db_id.clone(),
            query: record.sql.clone(),
            tables_extracted: extract_tables(&record.sql),
        })
        .collect()
}

/// Ask the resolver about every record, pacing requests through `pacer`.
///
/// `ground_truth` must be positionally aligned with `records`; each record's
/// vocabulary comes from the ground-truth sets overlapping its own.
pub async fn predict_tables(
    records: &[Record],
    ground_truth: &[SqlTablesEntry],
    resolver: &EntityResolver<'_>,
    pacer: &dyn Pacer,
) -> Vec<PredictionEntry> {
    let all_tables: Vec<TableSet> = ground_truth
        .iter()
        .map(|entry| entry.tables_extracted.clone())
        .collect();

    let mut predictions = Vec::with_capacity(records.len());
    for (index, (record, truth)) in records.iter().zip(&all_tables).enumerate() {
        pacer.before_request(index).await;

        let vocabulary = candidate_vocabulary(truth, &all_tables);
        let tables = resolver.resolve(&record.question, &vocabulary).await;
        log::debug!(
            "Record {:?} ({}): {} candidates, {} predicted",
            record.question_id,
            record.db_id,
            vocabulary.len(),
            tables.len()
        );

        predictions.push(PredictionEntry {
            question_id: record.question_id.clone(),
            db_id: record.db_id.clone(),
            question: record.question.clone(),
            tables_extracted: tables,
        });

        if (index + 1) % 50 == 0 {
            log::info!("Resolved {}/{} questions", index + 1, records.len());
        }
    }
    predictions
}

/// Full extraction run: read the input, write `output_sql.json`, query the
/// model for every question and write `output_llm.json`.
pub async fn run_extraction(config: &Config, client: &dyn ChatClient, pacer: &dyn Pacer) -> Result<ExtractionSummary> {
    log::info!("Loading {}", config.paths.input.display());
    let records = load_records(&config.paths.input)?;
    log::info!("Loaded {} records", records.len());

    log::info!("Extracting tables from SQL queries...");
    let ground_truth = extract_ground_truth(&records);
    let sql_path = config.output_sql_path();
    write_json(&sql_path, &ground_truth)?;
    log::info!("File with extracted tables saved to {}", sql_path.display());

    log::info!("Querying the LLM for each question...");
    let resolver = EntityResolver::new(client, config.llm.resolver_model.clone());
    let predictions = predict_tables(&records, &ground_truth, &resolver, pacer).await;
    let llm_path = config.output_llm_path();
    write_json(&llm_path, &predictions)?;
    log::info!("File with LLM responses saved to {}", llm_path.display());

    Ok(ExtractionSummary {
        records: records.len(),
        empty_ground_truth: ground_truth
            .iter()
            .filter(|entry| entry.tables_extracted.is_empty())
            .count(),
        empty_predictions: predictions
            .iter()
            .filter(|entry| entry.tables_extracted.is_empty())
            .count(),
    })
}
