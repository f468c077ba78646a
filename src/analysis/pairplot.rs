use serde::Serialize;

use super::numeric::FeatureMatrix;
use crate::data::model::Table;
use crate::error::AnalysisError;

const HISTOGRAM_BINS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub feature: String,
    /// `counts.len() + 1` bin edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

/// Inputs for a scatter-matrix: complete rows of the plotted features plus a
/// histogram per feature for the diagonal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairPlotData {
    pub features: Vec<String>,
    /// Column-major values over rows complete in every plotted feature.
    pub columns: Vec<Vec<f64>>,
    pub histograms: Vec<Histogram>,
}

impl PairPlotData {
    pub fn n_rows(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }
}

/// Whether the pair plot is offered for `n_numeric` features.
pub fn pair_plot_available(n_numeric: usize, max_features: usize) -> bool {
    (2..=max_features).contains(&n_numeric)
}

/// Build the pair plot for the first `max_features` numeric features. Rows
/// with any missing value are dropped; nothing left is a
/// [`AnalysisError::VisualizationFailure`].
pub fn pair_plot(
    table: &Table,
    numeric: &[String],
    max_features: usize,
) -> Result<PairPlotData, AnalysisError> {
    if numeric.len() < 2 {
        return Err(AnalysisError::InsufficientFeatures {
            needed: 2,
            found: numeric.len(),
        });
    }
    let features = &numeric[..numeric.len().min(max_features)];
    let matrix = FeatureMatrix::from_table(table, features)?;

    let keep = matrix.complete_rows();
    if keep.is_empty() {
        return Err(AnalysisError::VisualizationFailure(
            "no rows left after dropping missing values".to_string(),
        ));
    }

    let columns: Vec<Vec<f64>> = matrix
        .columns
        .iter()
        .map(|c| keep.iter().filter_map(|&r| c[r]).collect())
        .collect();

    let histograms = matrix
        .features
        .iter()
        .zip(&columns)
        .map(|(f, values)| histogram(f, values, HISTOGRAM_BINS))
        .collect();

    Ok(PairPlotData {
        features: matrix.features,
        columns,
        histograms,
    })
}

fn histogram(feature: &str, values: &[f64], bins: usize) -> Histogram {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if values.is_empty() || (max - min).abs() < f64::EPSILON {
        return Histogram {
            feature: feature.to_string(),
            edges: if values.is_empty() { vec![] } else { vec![min - 0.5, min + 0.5] },
            counts: if values.is_empty() { vec![] } else { vec![values.len()] },
        };
    }

    let width = (max - min) / bins as f64;
    let edges = (0..=bins).map(|i| min + width * i as f64).collect();
    let mut counts = vec![0; bins];
    for &v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Histogram {
        feature: feature.to_string(),
        edges,
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, Value};

    fn floats(v: &[Option<f64>]) -> Vec<Value> {
        v.iter().map(|x| x.map(Value::Float).unwrap_or(Value::Null)).collect()
    }

    #[test]
    fn availability_window() {
        assert!(!pair_plot_available(1, 6));
        assert!(pair_plot_available(2, 6));
        assert!(pair_plot_available(6, 6));
        assert!(!pair_plot_available(7, 6));
    }

    #[test]
    fn empty_after_dropna_is_a_visualization_failure() {
        let t = Table::new(vec![
            Column::infer("a", floats(&[Some(1.0), None])),
            Column::infer("b", floats(&[None, Some(2.0)])),
        ])
        .unwrap();
        let err = pair_plot(&t, &t.column_names(), 6).unwrap_err();
        assert!(matches!(err, AnalysisError::VisualizationFailure(_)));
    }

    #[test]
    fn drops_incomplete_rows_and_bins_values() {
        let t = Table::new(vec![
            Column::infer("a", floats(&[Some(0.0), Some(5.0), None, Some(10.0)])),
            Column::infer("b", floats(&[Some(1.0), Some(1.0), Some(3.0), Some(1.0)])),
        ])
        .unwrap();
        let p = pair_plot(&t, &t.column_names(), 6).unwrap();
        assert_eq!(p.n_rows(), 3);
        assert_eq!(p.histograms[0].counts.iter().sum::<usize>(), 3);
        assert_eq!(p.histograms[0].edges.len(), HISTOGRAM_BINS + 1);
        assert_eq!(p.histograms[1].counts, vec![3]);
    }

    #[test]
    fn caps_feature_count() {
        let cols: Vec<Column> = (0..8)
            .map(|i| Column::infer(format!("f{i}"), floats(&[Some(i as f64), Some(1.0 + i as f64)])))
            .collect();
        let t = Table::new(cols).unwrap();
        let p = pair_plot(&t, &t.column_names(), 6).unwrap();
        assert_eq!(p.features.len(), 6);
    }
}
