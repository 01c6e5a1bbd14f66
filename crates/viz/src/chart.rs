//! Categorical breakdowns for bar-chart renderers.
//!
//! Groups rows by an arbitrary categorical column plus the dataset iteration
//! label and emits counts and within-iteration percentages. The renderer
//! draws one bar group per iteration.

use std::collections::BTreeMap;

use boardtrace_recon::error::ReconError;
use boardtrace_recon::table::Table;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CategoryCount {
    pub iteration: String,
    pub category: String,
    pub count: usize,
    /// Share of this iteration's rows falling in this category.
    pub percent: f64,
}

/// Count rows per (iteration, category value). Rows with an empty category
/// cell are skipped. `iteration` labels the dataset the table came from.
pub fn category_breakdown(
    table: &Table,
    iteration: &str,
    column: &str,
) -> Result<Vec<CategoryCount>, ReconError> {
    let idx = table.require(column)?;

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total = 0usize;
    for row in &table.rows {
        let Some(value) = table.cell(row, idx) else { continue };
        *counts.entry(value.trim().to_string()).or_insert(0) += 1;
        total += 1;
    }

    Ok(counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            iteration: iteration.to_string(),
            category,
            count,
            percent: if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            },
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(values: &[Option<&str>]) -> Table {
        let mut t = Table::new("full", vec!["Category".into()]);
        for v in values {
            t.rows.push(vec![v.map(String::from)]);
        }
        t
    }

    #[test]
    fn counts_and_percentages() {
        let t = table(&[
            Some("Training"),
            Some("Training"),
            Some("Spontaneous"),
            None,
        ]);
        let out = category_breakdown(&t, "iteration_1", "Category").unwrap();
        assert_eq!(out.len(), 2);
        // BTreeMap: Spontaneous before Training.
        assert_eq!(out[0].category, "Spontaneous");
        assert_eq!(out[0].count, 1);
        assert!((out[0].percent - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(out[1].category, "Training");
        assert_eq!(out[1].count, 2);
        assert_eq!(out[1].iteration, "iteration_1");
    }

    #[test]
    fn missing_column_errors() {
        let t = table(&[]);
        assert!(category_breakdown(&t, "i", "Type of Sign").is_err());
    }
}
