use serde::Serialize;

use super::profile::percent;
use crate::data::model::Table;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingEntry {
    pub column: String,
    pub count: usize,
    pub percent: f64,
}

/// Missing-value report for a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MissingReport {
    /// Not a single missing cell anywhere.
    Complete,
    /// Columns with at least one missing value, most missing first.
    Missing {
        total: usize,
        entries: Vec<MissingEntry>,
    },
}

impl MissingReport {
    pub fn entries(&self) -> &[MissingEntry] {
        match self {
            MissingReport::Complete => &[],
            MissingReport::Missing { entries, .. } => entries,
        }
    }
}

/// Columns with missing data, sorted by count descending (ties keep column
/// order).
pub fn missing_report(table: &Table) -> MissingReport {
    let mut entries: Vec<MissingEntry> = table
        .columns()
        .iter()
        .map(|c| (c.name.clone(), c.null_count()))
        .filter(|(_, count)| *count > 0)
        .map(|(column, count)| MissingEntry {
            column,
            count,
            percent: percent(count, table.n_rows()),
        })
        .collect();

    if entries.is_empty() {
        return MissingReport::Complete;
    }

    entries.sort_by(|a, b| b.count.cmp(&a.count));
    MissingReport::Missing {
        total: entries.iter().map(|e| e.count).sum(),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, Value};

    #[test]
    fn complete_table_has_distinct_state() {
        let t = Table::new(vec![
            Column::infer("population", [10, 20, 30, 1000].into_iter().map(Value::Integer).collect()),
            Column::infer(
                "status",
                ["EN", "EN", "VU", "CR"].iter().map(|s| Value::String(s.to_string())).collect(),
            ),
        ])
        .unwrap();
        let report = missing_report(&t);
        assert_eq!(report, MissingReport::Complete);
        assert!(report.entries().is_empty());
    }

    #[test]
    fn missing_columns_sorted_by_count() {
        let t = Table::new(vec![
            Column::infer("a", vec![Value::Integer(1), Value::Null, Value::Integer(3), Value::Integer(4)]),
            Column::infer("b", vec![Value::Null, Value::Null, Value::Null, Value::Integer(1)]),
            Column::infer("c", vec![Value::Integer(1); 4]),
        ])
        .unwrap();
        match missing_report(&t) {
            MissingReport::Missing { total, entries } => {
                assert_eq!(total, 4);
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0].column, "b");
                assert!((entries[0].percent - 75.0).abs() < 1e-12);
                assert_eq!(entries[1].column, "a");
            }
            MissingReport::Complete => panic!("expected missing values"),
        }
    }
}
