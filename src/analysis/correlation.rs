use serde::Serialize;

use super::numeric::FeatureMatrix;
use crate::data::model::Table;
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

/// Square Pearson matrix indexed by `features`. Off-diagonal entries are
/// `None` when a pair has fewer than two complete rows, no variance over
/// them or an infinite cell among them; the diagonal is always exactly 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub features: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i)?.get(j).copied().flatten()
    }
}

/// Pairwise-complete Pearson correlation over `features`.
pub fn correlate(table: &Table, features: &[String]) -> Result<CorrelationMatrix, AnalysisError> {
    let matrix = FeatureMatrix::from_table(table, features)?;
    let n = matrix.n_features();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        values[i][i] = Some(1.0);
        for j in (i + 1)..n {
            let r = pearson_pairwise(&matrix.columns[i], &matrix.columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        features: matrix.features,
        values,
    })
}

/// Pearson coefficient over rows where both inputs are present.
pub fn pearson_pairwise(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

// ---------------------------------------------------------------------------
// Strongest pairs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationPair {
    pub feature_a: String,
    pub feature_b: String,
    /// Signed coefficient, kept for display.
    pub coefficient: f64,
    pub abs_coefficient: f64,
}

/// The `n` most strongly correlated distinct pairs by absolute value.
/// Walks the upper triangle row by row, so each unordered pair appears once
/// and ties keep that order. Undefined coefficients are skipped.
pub fn top_pairs(matrix: &CorrelationMatrix, n: usize) -> Vec<CorrelationPair> {
    let mut pairs = Vec::new();
    for i in 0..matrix.len() {
        for j in (i + 1)..matrix.len() {
            if let Some(r) = matrix.get(i, j) {
                pairs.push(CorrelationPair {
                    feature_a: matrix.features[i].clone(),
                    feature_b: matrix.features[j].clone(),
                    coefficient: r,
                    abs_coefficient: r.abs(),
                });
            }
        }
    }
    pairs.sort_by(|a, b| b.abs_coefficient.total_cmp(&a.abs_coefficient));
    pairs.truncate(n);
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{Format, parse_bytes};
    use crate::data::model::{Column, Value};
    use bytes::Bytes;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn float_table(cols: &[(&str, Vec<Option<f64>>)]) -> Table {
        Table::new(
            cols.iter()
                .map(|(name, vals)| {
                    Column::infer(
                        *name,
                        vals.iter()
                            .map(|v| v.map(Value::Float).unwrap_or(Value::Null))
                            .collect(),
                    )
                })
                .collect(),
        )
        .unwrap()
    }

    fn names(t: &Table) -> Vec<String> {
        t.column_names()
    }

    #[test]
    fn perfect_and_inverse_correlation() {
        let t = float_table(&[
            ("a", vec![Some(1.0), Some(2.0), Some(3.0)]),
            ("b", vec![Some(2.0), Some(4.0), Some(6.0)]),
            ("c", vec![Some(3.0), Some(2.0), Some(1.0)]),
        ]);
        let m = correlate(&t, &names(&t)).unwrap();
        assert!((m.get(0, 1).unwrap() - 1.0).abs() < 1e-12);
        assert!((m.get(0, 2).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pairwise_complete_ignores_missing_rows() {
        let t = float_table(&[
            ("a", vec![Some(1.0), Some(2.0), None, Some(4.0)]),
            ("b", vec![Some(1.0), Some(2.0), Some(100.0), Some(4.0)]),
        ]);
        let m = correlate(&t, &names(&t)).unwrap();
        assert!((m.get(0, 1).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_column_has_undefined_off_diagonal() {
        let t = float_table(&[
            ("a", vec![Some(5.0); 4]),
            ("b", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
        ]);
        let m = correlate(&t, &names(&t)).unwrap();
        assert_eq!(m.get(0, 1), None);
        assert_eq!(m.get(0, 0), Some(1.0));
        assert!(top_pairs(&m, 10).is_empty());
    }

    #[test]
    fn infinite_cell_leaves_pairs_undefined() {
        let raw = "a,b,c\n1,2,1\n2,inf,3\n3,5,2\n4,7,4\n";
        let t = parse_bytes(Bytes::from(raw), Format::Csv).unwrap();
        let m = correlate(&t, &names(&t)).unwrap();
        assert_eq!(m.get(0, 1), None);
        assert_eq!(m.get(1, 2), None);
        assert_eq!(m.get(1, 1), Some(1.0));

        let top = top_pairs(&m, 3);
        assert_eq!(top.len(), 1);
        assert_eq!((top[0].feature_a.as_str(), top[0].feature_b.as_str()), ("a", "c"));
        assert!(top[0].coefficient.is_finite());
    }

    #[test]
    fn top_pairs_orders_by_absolute_value() {
        let t = float_table(&[
            ("a", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
            ("b", vec![Some(4.0), Some(3.0), Some(2.0), Some(1.0)]),
            ("c", vec![Some(1.0), Some(3.0), Some(2.0), Some(4.0)]),
        ]);
        let m = correlate(&t, &names(&t)).unwrap();
        let top = top_pairs(&m, 2);
        assert_eq!(top.len(), 2);
        assert_eq!((top[0].feature_a.as_str(), top[0].feature_b.as_str()), ("a", "b"));
        assert!(top[0].coefficient < 0.0);
        assert!((top[0].abs_coefficient - 1.0).abs() < 1e-12);
        assert!(top[0].abs_coefficient >= top[1].abs_coefficient);
    }

    fn columns_strategy() -> impl Strategy<Value = Vec<Vec<Option<f64>>>> {
        (1usize..6, 2usize..20).prop_flat_map(|(k, rows)| {
            prop::collection::vec(
                prop::collection::vec(prop::option::weighted(0.9, -1e3f64..1e3), rows),
                k,
            )
        })
    }

    proptest! {
        #[test]
        fn matrix_is_symmetric_with_unit_diagonal(cols in columns_strategy()) {
            let named: Vec<(String, Vec<Option<f64>>)> = cols
                .into_iter()
                .enumerate()
                .map(|(i, c)| (format!("f{i}"), c))
                .collect();
            let borrowed: Vec<(&str, Vec<Option<f64>>)> =
                named.iter().map(|(n, c)| (n.as_str(), c.clone())).collect();
            let t = float_table(&borrowed);
            let m = correlate(&t, &names(&t)).unwrap();
            for i in 0..m.len() {
                prop_assert!((m.get(i, i).unwrap() - 1.0).abs() < 1e-9);
                for j in 0..m.len() {
                    prop_assert_eq!(m.get(i, j), m.get(j, i));
                    if let Some(r) = m.get(i, j) {
                        prop_assert!((-1.0..=1.0).contains(&r));
                    }
                }
            }

            let top = top_pairs(&m, 10);
            let mut seen = HashSet::new();
            for p in &top {
                prop_assert_ne!(&p.feature_a, &p.feature_b);
                let key = if p.feature_a < p.feature_b {
                    (p.feature_a.clone(), p.feature_b.clone())
                } else {
                    (p.feature_b.clone(), p.feature_a.clone())
                };
                prop_assert!(seen.insert(key));
            }
        }
    }
}
