use std::collections::HashMap;

use serde::Serialize;

use super::numeric::{self, numeric_columns, require_numeric};
use crate::data::model::{Column, DType, Table, Value};
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Whole-table overview
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub rows: usize,
    pub columns: usize,
    pub numeric_columns: usize,
    /// Missing cells over all cells, in percent.
    pub missing_percent: f64,
}

pub fn overview(table: &Table) -> Overview {
    let cells = table.n_rows() * table.n_cols();
    let missing_percent = if cells == 0 {
        0.0
    } else {
        table.total_nulls() as f64 / cells as f64 * 100.0
    };
    Overview {
        rows: table.n_rows(),
        columns: table.n_cols(),
        numeric_columns: numeric_columns(table).len(),
        missing_percent,
    }
}

// ---------------------------------------------------------------------------
// Per-column profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: DType,
    pub null_count: usize,
    pub null_percent: f64,
    pub n_unique: usize,
    /// First row's value as text, `"N/A"` for an empty table.
    pub example: String,
    pub memory_kb: f64,
}

/// One profile per column, in table order. Always computed fresh.
pub fn profile(table: &Table) -> Vec<ColumnProfile> {
    let n_rows = table.n_rows();
    table
        .columns()
        .iter()
        .map(|col| {
            let null_count = col.null_count();
            ColumnProfile {
                name: col.name.clone(),
                dtype: col.dtype,
                null_count,
                null_percent: percent(null_count, n_rows),
                n_unique: col.n_unique(),
                example: col
                    .values
                    .first()
                    .map(|v| match v {
                        Value::Null => "nan".to_string(),
                        other => other.to_string(),
                    })
                    .unwrap_or_else(|| "N/A".to_string()),
                memory_kb: col.memory_bytes() as f64 / 1024.0,
            }
        })
        .collect()
}

pub(crate) fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

// ---------------------------------------------------------------------------
// Value counts (categorical distributions)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub label: String,
    pub count: usize,
    /// Share of the column's non-missing values, in percent.
    pub percent: f64,
}

/// Non-missing value frequencies, most common first; ties keep the order of
/// first appearance. `None` when the column does not exist.
pub fn value_counts(table: &Table, column: &str) -> Option<Vec<ValueCount>> {
    let col = table.column(column)?;
    let counts = ordered_counts(col);
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    Some(
        counts
            .into_iter()
            .map(|(value, count)| ValueCount {
                label: value.to_string(),
                count,
                percent: percent(count, total),
            })
            .collect(),
    )
}

fn ordered_counts(col: &Column) -> Vec<(&Value, usize)> {
    let mut index: HashMap<&Value, usize> = HashMap::new();
    let mut counts: Vec<(&Value, usize)> = Vec::new();
    for value in col.values.iter().filter(|v| !v.is_null()) {
        match index.get(value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

// ---------------------------------------------------------------------------
// Summary statistics (describe)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SummaryCell {
    Number(f64),
    Text(String),
}

impl std::fmt::Display for SummaryCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryCell::Number(v) => write!(f, "{v:.4}"),
            SummaryCell::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Statistics × columns grid. `cells[stat][col]` is `None` when the
/// statistic does not apply to the column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub statistics: Vec<String>,
    pub columns: Vec<String>,
    pub cells: Vec<Vec<Option<SummaryCell>>>,
}

impl SummaryTable {
    pub fn get(&self, statistic: &str, column: &str) -> Option<&SummaryCell> {
        let s = self.statistics.iter().position(|x| x == statistic)?;
        let c = self.columns.iter().position(|x| x == column)?;
        self.cells[s][c].as_ref()
    }
}

const NUMERIC_STATS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];
const OBJECT_STATS: [&str; 4] = ["count", "unique", "top", "freq"];

/// Describe the table. With `numeric_only` the numeric columns are
/// summarised (count/mean/std/min/quartiles/max) and a table without any
/// yields [`AnalysisError::EmptyNumericSet`]. Otherwise every column is
/// included and non-numeric ones get count/unique/top/freq.
pub fn summarize(table: &Table, numeric_only: bool) -> Result<SummaryTable, AnalysisError> {
    let columns: Vec<&Column> = if numeric_only {
        require_numeric(table)?
            .iter()
            .filter_map(|name| table.column(name))
            .collect()
    } else {
        table.columns().iter().collect()
    };

    let has_numeric = columns.iter().any(|c| c.dtype.is_numeric());
    let has_object = columns.iter().any(|c| !c.dtype.is_numeric());

    let mut statistics: Vec<&str> = Vec::new();
    if has_object {
        statistics.extend(OBJECT_STATS);
    }
    if has_numeric {
        for stat in NUMERIC_STATS {
            if !statistics.contains(&stat) {
                statistics.push(stat);
            }
        }
    }

    let per_column: Vec<HashMap<&str, SummaryCell>> = columns
        .iter()
        .map(|c| {
            if c.dtype.is_numeric() {
                describe_numeric(c)
            } else {
                describe_object(c)
            }
        })
        .collect();

    let cells = statistics
        .iter()
        .map(|stat| per_column.iter().map(|m| m.get(stat).cloned()).collect())
        .collect();

    Ok(SummaryTable {
        statistics: statistics.iter().map(|s| s.to_string()).collect(),
        columns: columns.iter().map(|c| c.name.clone()).collect(),
        cells,
    })
}

fn describe_numeric(col: &Column) -> HashMap<&'static str, SummaryCell> {
    let values = col.present_f64();
    let sorted = numeric::sorted(&values);
    let mut out = HashMap::new();
    out.insert("count", SummaryCell::Number(values.len() as f64));

    let stats = [
        ("mean", numeric::mean(&values)),
        ("std", numeric::std_dev(&values, 1)),
        ("min", sorted.first().copied()),
        ("25%", numeric::quantile_sorted(&sorted, 0.25)),
        ("50%", numeric::quantile_sorted(&sorted, 0.5)),
        ("75%", numeric::quantile_sorted(&sorted, 0.75)),
        ("max", sorted.last().copied()),
    ];
    for (name, value) in stats {
        if let Some(v) = value {
            out.insert(name, SummaryCell::Number(v));
        }
    }
    out
}

fn describe_object(col: &Column) -> HashMap<&'static str, SummaryCell> {
    let counts = ordered_counts(col);
    let non_null: usize = counts.iter().map(|(_, n)| n).sum();
    let mut out = HashMap::new();
    out.insert("count", SummaryCell::Number(non_null as f64));
    out.insert("unique", SummaryCell::Number(counts.len() as f64));
    if let Some((top, freq)) = counts.first() {
        out.insert("top", SummaryCell::Text(top.to_string()));
        out.insert("freq", SummaryCell::Number(*freq as f64));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn species() -> Table {
        let text = |v: &[&str]| v.iter().map(|s| Value::String(s.to_string())).collect();
        Table::new(vec![
            Column::infer("species", text(&["Kakapo", "Vaquita", "Saola", "Kakapo"])),
            Column::infer("status", text(&["CR", "CR", "EN", "CR"])),
            Column::infer(
                "population",
                vec![
                    Value::Integer(252),
                    Value::Null,
                    Value::Integer(100),
                    Value::Integer(300),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn profile_reports_nulls_and_uniques() {
        let p = profile(&species());
        assert_eq!(p.len(), 3);
        let pop = &p[2];
        assert_eq!(pop.dtype, DType::Float64);
        assert_eq!(pop.null_count, 1);
        assert!((pop.null_percent - 25.0).abs() < 1e-12);
        assert_eq!(pop.n_unique, 3);
        assert_eq!(p[0].example, "Kakapo");
        assert_eq!(p[0].n_unique, 3);
        assert!((pop.memory_kb - 32.0 / 1024.0).abs() < 1e-12);
    }

    #[test]
    fn overview_counts_missing_cells() {
        let o = overview(&species());
        assert_eq!(o.rows, 4);
        assert_eq!(o.columns, 3);
        assert_eq!(o.numeric_columns, 1);
        assert!((o.missing_percent - 100.0 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn value_counts_most_common_first() {
        let counts = value_counts(&species(), "status").unwrap();
        assert_eq!(counts[0].label, "CR");
        assert_eq!(counts[0].count, 3);
        assert!((counts[0].percent - 75.0).abs() < 1e-12);
        assert!(value_counts(&species(), "continent").is_none());
    }

    #[test]
    fn numeric_summary_uses_sample_std() {
        let s = summarize(&species(), true).unwrap();
        assert_eq!(s.columns, vec!["population"]);
        assert_eq!(s.statistics.len(), 8);
        assert_eq!(s.get("count", "population"), Some(&SummaryCell::Number(3.0)));
        let SummaryCell::Number(sd) = s.get("std", "population").unwrap() else {
            panic!("std should be numeric");
        };
        // values 100, 252, 300 → sample std ≈ 104.41
        assert!((sd - 104.4095).abs() < 1e-3);
        assert_eq!(s.get("50%", "population"), Some(&SummaryCell::Number(252.0)));
    }

    #[test]
    fn numeric_summary_without_numeric_columns() {
        let t = species().select(&["species".to_string()]);
        assert_eq!(summarize(&t, true), Err(AnalysisError::EmptyNumericSet));
    }

    #[test]
    fn full_summary_mixes_statistics() {
        let s = summarize(&species(), false).unwrap();
        assert_eq!(
            s.statistics,
            vec!["count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%", "max"]
        );
        assert_eq!(s.get("top", "species"), Some(&SummaryCell::Text("Kakapo".into())));
        assert_eq!(s.get("freq", "status"), Some(&SummaryCell::Number(3.0)));
        assert_eq!(s.get("mean", "species"), None);
        assert_eq!(s.get("unique", "population"), None);
    }
}
