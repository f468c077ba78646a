use nalgebra::{DMatrix, SymmetricEigen};
use serde::Serialize;

use super::standardize::StandardizedMatrix;
use crate::error::AnalysisError;

/// Scores on the first two principal components.
///
/// Component signs come straight from the eigen solver and are not
/// normalised; only magnitudes and variance ratios are stable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PcaProjection {
    /// Original row index of each projected point (rows complete across all
    /// features).
    pub row_indices: Vec<usize>,
    pub pc1: Vec<f64>,
    pub pc2: Vec<f64>,
    /// Eigenvalues of the covariance matrix for PC1 and PC2.
    pub explained_variance: [f64; 2],
    /// Share of total variance for PC1 and PC2.
    pub variance_ratio: [f64; 2],
}

impl PcaProjection {
    pub fn total_ratio(&self) -> f64 {
        self.variance_ratio[0] + self.variance_ratio[1]
    }
}

/// Project standardized data onto its two leading principal components.
pub fn reduce(standardized: &StandardizedMatrix) -> Result<PcaProjection, AnalysisError> {
    let k = standardized.features.len();
    if k < 2 {
        return Err(AnalysisError::InsufficientFeatures { needed: 2, found: k });
    }

    let row_indices: Vec<usize> = (0..standardized.n_rows)
        .filter(|&r| standardized.columns.iter().all(|c| c[r].is_some()))
        .collect();
    let n = row_indices.len();
    if n == 0 {
        return Err(AnalysisError::NoCompleteRows);
    }
    if n < 2 {
        return Err(AnalysisError::Numerical(
            "need at least two complete rows for PCA".to_string(),
        ));
    }

    // column-major fill, one feature at a time
    let data: Vec<f64> = standardized
        .columns
        .iter()
        .flat_map(|c| row_indices.iter().filter_map(move |&r| c[r]))
        .collect();
    let mut x = DMatrix::from_vec(n, k, data);

    for j in 0..k {
        let m = x.column(j).mean();
        x.column_mut(j).add_scalar_mut(-m);
    }

    let cov = x.transpose() * &x / (n as f64 - 1.0);
    let eig = SymmetricEigen::new(cov);

    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&a, &b| eig.eigenvalues[b].total_cmp(&eig.eigenvalues[a]));

    let lambdas: Vec<f64> = eig.eigenvalues.iter().map(|l| l.max(0.0)).collect();
    let total: f64 = lambdas.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(AnalysisError::Numerical(
            "covariance matrix has no variance".to_string(),
        ));
    }

    let (first, second) = (order[0], order[1]);
    let pc1 = &x * eig.eigenvectors.column(first);
    let pc2 = &x * eig.eigenvectors.column(second);

    log::debug!(
        "PCA over {n} rows x {k} features: ratios {:.3} / {:.3}",
        lambdas[first] / total,
        lambdas[second] / total
    );

    Ok(PcaProjection {
        row_indices,
        pc1: pc1.iter().copied().collect(),
        pc2: pc2.iter().copied().collect(),
        explained_variance: [lambdas[first], lambdas[second]],
        variance_ratio: [lambdas[first] / total, lambdas[second] / total],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::numeric;
    use crate::analysis::standardize::standardize;
    use crate::data::model::{Column, Table, Value};
    use proptest::prelude::*;

    fn standardized(cols: Vec<(&str, Vec<Option<f64>>)>) -> StandardizedMatrix {
        let t = Table::new(
            cols.into_iter()
                .map(|(n, v)| {
                    Column::infer(n, v.into_iter().map(|x| x.map(Value::Float).unwrap_or(Value::Null)).collect())
                })
                .collect(),
        )
        .unwrap();
        standardize(&t, &t.column_names()).unwrap()
    }

    #[test]
    fn single_feature_is_rejected() {
        let s = standardized(vec![("a", vec![Some(1.0), Some(2.0), Some(3.0)])]);
        assert_eq!(
            reduce(&s),
            Err(AnalysisError::InsufficientFeatures { needed: 2, found: 1 })
        );
    }

    #[test]
    fn collinear_features_load_on_first_component() {
        let s = standardized(vec![
            ("a", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
            ("b", vec![Some(2.0), Some(4.0), Some(6.0), Some(8.0)]),
        ]);
        let p = reduce(&s).unwrap();
        assert!((p.variance_ratio[0] - 1.0).abs() < 1e-9);
        assert!(p.variance_ratio[1].abs() < 1e-9);
        assert_eq!(p.pc1.len(), 4);
        // sign is solver-defined, magnitude is not
        assert!((p.pc1[0].abs() - p.pc1[3].abs()).abs() < 1e-9);
    }

    #[test]
    fn incomplete_rows_are_left_out() {
        let s = standardized(vec![
            ("a", vec![Some(1.0), None, Some(3.0), Some(4.0), Some(0.0)]),
            ("b", vec![Some(2.0), Some(1.0), Some(1.0), Some(8.0), Some(5.0)]),
        ]);
        let p = reduce(&s).unwrap();
        assert_eq!(p.row_indices, vec![0, 2, 3, 4]);
        assert_eq!(p.pc2.len(), 4);
    }

    #[test]
    fn score_variance_matches_eigenvalues() {
        let s = standardized(vec![
            ("a", vec![Some(1.0), Some(5.0), Some(2.0), Some(8.0), Some(3.0)]),
            ("b", vec![Some(2.0), Some(1.0), Some(7.0), Some(3.0), Some(4.0)]),
            ("c", vec![Some(9.0), Some(3.0), Some(4.0), Some(1.0), Some(6.0)]),
        ]);
        let p = reduce(&s).unwrap();
        let v1 = numeric::variance(&p.pc1, 1).unwrap();
        let v2 = numeric::variance(&p.pc2, 1).unwrap();
        assert!((v1 - p.explained_variance[0]).abs() < 1e-9);
        assert!((v2 - p.explained_variance[1]).abs() < 1e-9);
        assert!(v1 >= v2);
    }

    proptest! {
        #[test]
        fn variance_ratios_are_bounded(
            rows in prop::collection::vec(prop::collection::vec(-100f64..100.0, 3), 4..30)
        ) {
            let cols: Vec<Vec<Option<f64>>> = (0..3)
                .map(|j| rows.iter().map(|r| Some(r[j])).collect())
                .collect();
            for c in &cols {
                let v: Vec<f64> = c.iter().flatten().copied().collect();
                prop_assume!(numeric::std_dev(&v, 0).unwrap() > 1e-3);
            }
            let s = standardized(vec![
                ("a", cols[0].clone()),
                ("b", cols[1].clone()),
                ("c", cols[2].clone()),
            ]);
            let p = reduce(&s).unwrap();
            for r in p.variance_ratio {
                prop_assert!((0.0..=1.0 + 1e-12).contains(&r));
            }
            prop_assert!(p.total_ratio() <= 1.0 + 1e-9);
        }
    }
}
