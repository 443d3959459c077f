use crate::dataset::TableSet;

/// Candidate vocabulary for one record: the union of every ground-truth set that
/// shares at least one table with `current` (its own set included).
///
/// Narrows the names offered to the resolver to tables that co-occur with the
/// record's own tables somewhere in the dataset.
pub fn candidate_vocabulary(current: &TableSet, all_ground_truth: &[TableSet]) -> TableSet {
    all_ground_truth
        .iter()
        .filter(|tables| current.iter().any(|t| tables.contains(t)))
        .flat_map(|tables| tables.iter().cloned())
        .collect()
}
