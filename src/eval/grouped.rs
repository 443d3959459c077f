//! Grouping by database and per-database F1.

use crate::dataset::{TableSet, TablesEntry};
use crate::eval::confusion::{calculate_tp_fp_fn_with, ClassificationMode};
use crate::eval::metrics::MetricsResult;
use std::collections::BTreeMap;

/// db_id -> table sets of that database's records, in input order.
pub type GroupedTableSets = BTreeMap<String, Vec<TableSet>>;

/// Group entries by db_id. Entries without `tables_extracted` still create
/// their (possibly empty) group but contribute no table set.
pub fn group_by_db(entries: &[TablesEntry]) -> GroupedTableSets {
    let mut grouped = GroupedTableSets::new();
    for entry in entries {
        let group = grouped.entry(entry.db_id.clone()).or_default();
        if let Some(tables) = &entry.tables_extracted {
            group.push(tables.clone());
        }
    }
    grouped
}

/// All table sets in input order, skipping entries without `tables_extracted`.
pub fn flatten_tables(entries: &[TablesEntry]) -> Vec<TableSet> {
    entries
        .iter()
        .filter_map(|entry| entry.tables_extracted.clone())
        .collect()
}

/// F1 per db_id, for databases present in both groupings only.
pub fn calculate_metrics_per_db(
    ground_truth: &GroupedTableSets,
    predictions: &GroupedTableSets,
    mode: ClassificationMode,
) -> BTreeMap<String, f64> {
    let mut db_metrics = BTreeMap::new();
    for (db_id, real) in ground_truth {
        let Some(predicted) = predictions.get(db_id) else {
            log::debug!("Skipping db_id {} (no predictions)", db_id);
            continue;
        };
        let counts = calculate_tp_fp_fn_with(real, predicted, mode);
        db_metrics.insert(db_id.clone(), MetricsResult::from_counts(&counts).f1_score);
    }
    db_metrics
}

/// Count positional mismatches between the two artifacts and log them.
///
/// Evaluation pairs records by position; a differing length or question_id
/// means the files were produced from different inputs. Returns the number of
/// problems found (0 when aligned).
pub fn check_alignment(ground_truth: &[TablesEntry], predictions: &[TablesEntry]) -> usize {
    let mut problems = 0;
    if ground_truth.len() != predictions.len() {
        log::warn!(
            "Ground truth has {} records but predictions have {}; comparing the first {}",
            ground_truth.len(),
            predictions.len(),
            ground_truth.len().min(predictions.len())
        );
        problems += 1;
    }
    for (index, (real, predicted)) in ground_truth.iter().zip(predictions).enumerate() {
        if real.question_id != predicted.question_id {
            log::warn!(
                "Record {} is misaligned: ground truth question_id {:?}, prediction question_id {:?}",
                index,
                real.question_id,
                predicted.question_id
            );
            problems += 1;
        }
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(question_id: u64, db_id: &str, tables: Option<&[&str]>) -> TablesEntry {
        TablesEntry {
            question_id: Some(question_id.into()),
            db_id: db_id.to_string(),
            tables_extracted: tables.map(|t| t.iter().map(|s| s.to_string()).collect()),
        }
    }

    #[test]
    fn groups_preserve_input_order() {
        let entries = vec![
            entry(1, "financial", Some(&["loan"])),
            entry(2, "schools", Some(&["frpm"])),
            entry(3, "financial", Some(&["account"])),
        ];
        let grouped = group_by_db(&entries);
        assert_eq!(grouped.len(), 2);
        let financial = &grouped["financial"];
        assert!(financial[0].contains("loan"));
        assert!(financial[1].contains("account"));
    }

    #[test]
    fn entries_without_tables_are_skipped() {
        let entries = vec![entry(1, "a", None), entry(2, "b", Some(&["t"]))];
        let grouped = group_by_db(&entries);
        assert!(grouped["a"].is_empty());
        assert_eq!(flatten_tables(&entries).len(), 1);
    }

    #[test]
    fn per_db_requires_both_sides() {
        let gt = group_by_db(&[
            entry(1, "shared", Some(&["a"])),
            entry(2, "gt_only", Some(&["b"])),
        ]);
        let pred = group_by_db(&[
            entry(1, "shared", Some(&["a"])),
            entry(3, "pred_only", Some(&["c"])),
        ]);
        let f1 = calculate_metrics_per_db(&gt, &pred, ClassificationMode::Leaky);
        assert_eq!(f1.len(), 1);
        assert!((f1["shared"] - 1.0).abs() < 1e-9);
        assert!(!f1.contains_key("gt_only"));
        assert!(!f1.contains_key("pred_only"));
    }

    #[test]
    fn per_db_leak_is_scoped_to_database() {
        // "b" is correct for another record of a different database, so inside
        // db "x" it is a plain false positive
        let gt = group_by_db(&[entry(1, "x", Some(&["a"])), entry(2, "y", Some(&["b"]))]);
        let pred = group_by_db(&[entry(1, "x", Some(&["b"])), entry(2, "y", Some(&["b"]))]);
        let f1 = calculate_metrics_per_db(&gt, &pred, ClassificationMode::Leaky);
        assert_eq!(f1["x"], 0.0);
        assert!((f1["y"] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn alignment_reports_mismatches() {
        let gt = vec![entry(1, "a", Some(&[])), entry(2, "a", Some(&[]))];
        let aligned = gt.clone();
        assert_eq!(check_alignment(&gt, &aligned), 0);

        let swapped = vec![entry(2, "a", Some(&[])), entry(1, "a", Some(&[]))];
        assert_eq!(check_alignment(&gt, &swapped), 2);

        let short = vec![entry(1, "a", Some(&[]))];
        assert_eq!(check_alignment(&gt, &short), 1);
    }
}
