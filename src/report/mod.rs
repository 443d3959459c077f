//! Presentation: console comparison table and the per-database F1 chart.

mod chart;

pub use chart::{render_f1_chart, write_f1_chart};

use crate::eval::MetricsResult;

/// Calculated-vs-LLM table; the LLM column reads `N/A` when no value exists.
pub fn format_comparison(calculated: &MetricsResult, llm: Option<&MetricsResult>) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<10} {:<15} {:<15}\n", "Metric", "Calculated", "LLM"));
    out.push_str(&format!("{:-<40}\n", ""));
    let llm_values = llm.map(MetricsResult::named);
    for (i, (metric, value)) in calculated.named().into_iter().enumerate() {
        match &llm_values {
            Some(values) => out.push_str(&format!("{:<10} {:<15.4} {:<15.4}\n", metric, value, values[i].1)),
            None => out.push_str(&format!("{:<10} {:<15.4} {:<15}\n", metric, value, "N/A")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_lists_all_metrics() {
        let calculated = MetricsResult {
            precision: 0.5,
            recall: 0.25,
            f1_score: 1.0 / 3.0,
        };
        let table = format_comparison(&calculated, Some(&calculated));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("Metric"));
        assert!(lines[2].starts_with("precision  0.5000"));
        assert!(lines[4].contains("0.3333"));
    }

    #[test]
    fn comparison_without_llm_shows_na() {
        let table = format_comparison(&MetricsResult::default(), None);
        assert_eq!(table.matches("N/A").count(), 3);
    }
}
