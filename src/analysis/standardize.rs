use serde::Serialize;

use super::numeric::{self, FeatureMatrix};
use crate::data::model::Table;
use crate::error::AnalysisError;

/// Mean and (population) standard deviation a feature was scaled with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalerStats {
    pub feature: String,
    pub mean: f64,
    pub std: f64,
}

/// Z-scored copy of the numeric features; missing cells stay missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardizedMatrix {
    pub features: Vec<String>,
    pub stats: Vec<ScalerStats>,
    /// Column-major, same shape as the input features.
    pub columns: Vec<Vec<Option<f64>>>,
    pub n_rows: usize,
}

impl StandardizedMatrix {
    /// First `n` rows, row-major, for tabular display.
    pub fn head_rows(&self, n: usize) -> Vec<Vec<Option<f64>>> {
        (0..n.min(self.n_rows))
            .map(|r| self.columns.iter().map(|c| c[r]).collect())
            .collect()
    }
}

/// Scale each feature to zero mean and unit variance using statistics of
/// the same table. A feature whose standard deviation is zero (up to
/// rounding relative to its largest magnitude) is reported as
/// [`AnalysisError::DegenerateColumn`]; the first one in feature order wins.
/// Infinite cells make the statistics unusable and fail with
/// [`AnalysisError::Numerical`].
pub fn standardize(table: &Table, features: &[String]) -> Result<StandardizedMatrix, AnalysisError> {
    let matrix = FeatureMatrix::from_table(table, features)?;

    let mut stats = Vec::with_capacity(matrix.n_features());
    for (name, column) in matrix.features.iter().zip(&matrix.columns) {
        let present: Vec<f64> = column.iter().flatten().copied().collect();
        let degenerate = || AnalysisError::DegenerateColumn {
            column: name.clone(),
        };
        let mean = numeric::mean(&present).ok_or_else(degenerate)?;
        let std = numeric::std_dev(&present, 0).ok_or_else(degenerate)?;
        if !mean.is_finite() || !std.is_finite() {
            return Err(AnalysisError::Numerical(format!(
                "column '{name}' contains non-finite values"
            )));
        }
        let scale = present.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
        if std <= 10.0 * f64::EPSILON * scale {
            return Err(degenerate());
        }
        stats.push(ScalerStats {
            feature: name.clone(),
            mean,
            std,
        });
    }

    let columns = matrix
        .columns
        .iter()
        .zip(&stats)
        .map(|(column, s)| column.iter().map(|v| v.map(|x| (x - s.mean) / s.std)).collect())
        .collect();

    Ok(StandardizedMatrix {
        features: matrix.features,
        stats,
        columns,
        n_rows: matrix.n_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{Format, parse_bytes};
    use crate::data::model::{Column, Value};
    use bytes::Bytes;
    use proptest::prelude::*;

    fn table(cols: Vec<(&str, Vec<Value>)>) -> Table {
        Table::new(cols.into_iter().map(|(n, v)| Column::infer(n, v)).collect()).unwrap()
    }

    fn ints(v: &[i64]) -> Vec<Value> {
        v.iter().map(|&i| Value::Integer(i)).collect()
    }

    #[test]
    fn constant_column_is_degenerate() {
        let t = table(vec![("a", ints(&[1, 2, 3, 4])), ("flat", ints(&[5, 5, 5, 5]))]);
        let err = standardize(&t, &t.column_names()).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::DegenerateColumn {
                column: "flat".into()
            }
        );
    }

    #[test]
    fn repeated_fraction_is_degenerate_despite_rounding() {
        let t = table(vec![("f", vec![Value::Float(0.1); 3])]);
        assert!(matches!(
            standardize(&t, &t.column_names()),
            Err(AnalysisError::DegenerateColumn { .. })
        ));
    }

    #[test]
    fn tiny_but_nonzero_spread_is_scaled() {
        let t = table(vec![(
            "micro",
            [1e-18, 2e-18, 3e-18, 4e-18].into_iter().map(Value::Float).collect(),
        )]);
        let s = standardize(&t, &t.column_names()).unwrap();
        let z: Vec<f64> = s.columns[0].iter().flatten().copied().collect();
        assert!(z.iter().all(|v| v.is_finite()));
        assert!((z[3] + z[0]).abs() < 1e-9);
        assert!((numeric::std_dev(&z, 0).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn infinite_cell_fails_instead_of_yielding_nan() {
        let raw = "a,b,c\n1,2,1\n2,inf,3\n3,5,2\n4,7,4\n";
        let t = parse_bytes(Bytes::from(raw), Format::Csv).unwrap();
        let err = standardize(&t, &t.column_names()).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::Numerical("column 'b' contains non-finite values".into())
        );
    }

    #[test]
    fn all_missing_column_is_degenerate() {
        let t = table(vec![("gone", vec![Value::Null; 3])]);
        assert!(standardize(&t, &t.column_names()).is_err());
    }

    #[test]
    fn missing_cells_stay_missing() {
        let t = table(vec![(
            "w",
            vec![Value::Float(1.0), Value::Null, Value::Float(3.0)],
        )]);
        let s = standardize(&t, &t.column_names()).unwrap();
        assert_eq!(s.columns[0], vec![Some(-1.0), None, Some(1.0)]);
        assert_eq!(s.stats[0].mean, 2.0);
        assert_eq!(s.head_rows(2), vec![vec![Some(-1.0)], vec![None]]);
    }

    proptest! {
        #[test]
        fn standardized_columns_have_zero_mean_unit_std(
            values in prop::collection::vec(-1e4f64..1e4, 3..50)
        ) {
            let spread = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
                - values.iter().cloned().fold(f64::INFINITY, f64::min);
            prop_assume!(spread > 1e-3);

            let t = table(vec![("x", values.into_iter().map(Value::Float).collect())]);
            let s = standardize(&t, &t.column_names()).unwrap();
            let z: Vec<f64> = s.columns[0].iter().flatten().copied().collect();
            let mean = numeric::mean(&z).unwrap();
            let sd = numeric::std_dev(&z, 0).unwrap();
            prop_assert!(mean.abs() < 1e-6);
            prop_assert!((sd - 1.0).abs() < 1e-6);
        }
    }
}
