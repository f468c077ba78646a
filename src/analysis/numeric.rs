use crate::data::model::Table;
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Numeric feature selection
// ---------------------------------------------------------------------------

/// Names of the integer/float columns, in table order.
pub fn numeric_columns(table: &Table) -> Vec<String> {
    table
        .columns()
        .iter()
        .filter(|c| c.dtype.is_numeric())
        .map(|c| c.name.clone())
        .collect()
}

/// Like [`numeric_columns`] but gates the numeric sections: an empty set is
/// reported as [`AnalysisError::EmptyNumericSet`].
pub fn require_numeric(table: &Table) -> Result<Vec<String>, AnalysisError> {
    let features = numeric_columns(table);
    if features.is_empty() {
        return Err(AnalysisError::EmptyNumericSet);
    }
    Ok(features)
}

/// Column-major numeric view of selected features; `None` is a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub features: Vec<String>,
    pub columns: Vec<Vec<Option<f64>>>,
    pub n_rows: usize,
}

impl FeatureMatrix {
    /// Extract `features` from `table`. Every name must be a numeric column.
    pub fn from_table(table: &Table, features: &[String]) -> Result<Self, AnalysisError> {
        if features.is_empty() {
            return Err(AnalysisError::EmptyNumericSet);
        }
        let columns = features
            .iter()
            .map(|name| {
                table
                    .column(name)
                    .filter(|c| c.dtype.is_numeric())
                    .map(|c| c.to_f64())
                    .ok_or_else(|| AnalysisError::UnknownColumn(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FeatureMatrix {
            features: features.to_vec(),
            columns,
            n_rows: table.n_rows(),
        })
    }

    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    /// Row indices with a value in every feature.
    pub fn complete_rows(&self) -> Vec<usize> {
        (0..self.n_rows)
            .filter(|&r| self.columns.iter().all(|c| c[r].is_some()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Descriptive helpers
// ---------------------------------------------------------------------------

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Variance with `ddof` delta degrees of freedom (0 = population, 1 = sample).
pub fn variance(values: &[f64], ddof: usize) -> Option<f64> {
    let m = mean(values)?;
    if values.len() <= ddof {
        return None;
    }
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(ss / (values.len() - ddof) as f64)
}

pub fn std_dev(values: &[f64], ddof: usize) -> Option<f64> {
    variance(values, ddof).map(f64::sqrt)
}

/// Quantile of already sorted data with linear interpolation between the
/// two closest ranks (the Pandas/NumPy default).
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, Value};
    use proptest::prelude::*;

    fn table() -> Table {
        Table::new(vec![
            Column::infer(
                "population",
                [10, 20, 30, 1000].into_iter().map(Value::Integer).collect(),
            ),
            Column::infer(
                "status",
                ["EN", "EN", "VU", "CR"]
                    .into_iter()
                    .map(|s| Value::String(s.into()))
                    .collect(),
            ),
            Column::infer(
                "weight",
                vec![Value::Float(1.5), Value::Null, Value::Float(2.0), Value::Float(3.0)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn selects_numeric_columns_in_order() {
        assert_eq!(numeric_columns(&table()), vec!["population", "weight"]);
    }

    fn cell_strategy(kind: u8) -> BoxedStrategy<Value> {
        let value = match kind {
            0 => any::<i64>().prop_map(Value::Integer).boxed(),
            1 => (-1e6f64..1e6).prop_map(Value::Float).boxed(),
            2 => any::<bool>().prop_map(Value::Bool).boxed(),
            _ => "[a-z]{1,6}".prop_map(Value::String).boxed(),
        };
        prop::option::weighted(0.8, value)
            .prop_map(|v| v.unwrap_or(Value::Null))
            .boxed()
    }

    fn typed_columns_strategy() -> impl Strategy<Value = Vec<Vec<Value>>> {
        (prop::collection::vec(0u8..4, 0..8), 1usize..6).prop_flat_map(|(kinds, rows)| {
            kinds
                .into_iter()
                .map(|k| prop::collection::vec(cell_strategy(k), rows))
                .collect::<Vec<_>>()
        })
    }

    proptest! {
        #[test]
        fn numeric_columns_are_exactly_the_numeric_cells(raw in typed_columns_strategy()) {
            // numeric when no cell is text or boolean; all-null reads as float
            let expected: Vec<String> = raw
                .iter()
                .enumerate()
                .filter(|(_, cells)| {
                    cells.iter().all(|c| matches!(c, Value::Integer(_) | Value::Float(_) | Value::Null))
                })
                .map(|(i, _)| format!("c{i}"))
                .collect();
            let t = Table::new(
                raw.into_iter()
                    .enumerate()
                    .map(|(i, cells)| Column::infer(format!("c{i}"), cells))
                    .collect(),
            )
            .unwrap();

            let selected = numeric_columns(&t);
            prop_assert_eq!(&selected, &expected);

            let names = t.column_names();
            let mut rest = names.iter();
            for name in &selected {
                prop_assert!(rest.any(|n| n == name));
            }
        }
    }

    #[test]
    fn no_numeric_columns_is_reported() {
        let t = table().select(&["status".to_string()]);
        assert_eq!(require_numeric(&t), Err(AnalysisError::EmptyNumericSet));
    }

    #[test]
    fn matrix_rejects_text_columns() {
        let err = FeatureMatrix::from_table(&table(), &["status".to_string()]).unwrap_err();
        assert_eq!(err, AnalysisError::UnknownColumn("status".into()));
    }

    #[test]
    fn complete_rows_skip_missing() {
        let m = FeatureMatrix::from_table(&table(), &numeric_columns(&table())).unwrap();
        assert_eq!(m.complete_rows(), vec![0, 2, 3]);
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let s = sorted(&[1000.0, 10.0, 30.0, 20.0]);
        assert_eq!(quantile_sorted(&s, 0.25), Some(17.5));
        assert_eq!(quantile_sorted(&s, 0.5), Some(25.0));
        assert_eq!(quantile_sorted(&s, 0.75), Some(272.5));
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }

    #[test]
    fn sample_and_population_variance() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(variance(&v, 0), Some(4.0));
        assert!((variance(&v, 1).unwrap() - 32.0 / 7.0).abs() < 1e-12);
        assert_eq!(variance(&[1.0], 1), None);
    }
}
