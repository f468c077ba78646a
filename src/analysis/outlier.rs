use serde::Serialize;

use super::numeric::{self, FeatureMatrix};
use super::profile::percent;
use crate::data::model::Table;
use crate::error::AnalysisError;

/// Tukey fence multiplier.
pub const IQR_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fences {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl Fences {
    fn from_sorted(sorted: &[f64]) -> Option<Self> {
        let q1 = numeric::quantile_sorted(sorted, 0.25)?;
        let q3 = numeric::quantile_sorted(sorted, 0.75)?;
        let iqr = q3 - q1;
        Some(Fences {
            q1,
            q3,
            iqr,
            lower_bound: q1 - IQR_FACTOR * iqr,
            upper_bound: q3 + IQR_FACTOR * iqr,
        })
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.lower_bound && v <= self.upper_bound
    }
}

/// IQR outlier summary for one feature. Missing cells are left out of both
/// the quantiles and the percentage denominator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    pub feature: String,
    pub non_missing: usize,
    /// `None` when the feature has no values at all.
    pub fences: Option<Fences>,
    pub outlier_count: usize,
    pub outlier_percent: f64,
}

/// Box-and-whisker geometry for one feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub feature: String,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// One report per selected feature, in selection order.
pub fn analyze(table: &Table, selected: &[String]) -> Result<Vec<OutlierReport>, AnalysisError> {
    let matrix = FeatureMatrix::from_table(table, selected)?;
    Ok(matrix
        .features
        .iter()
        .zip(&matrix.columns)
        .map(|(feature, column)| {
            let sorted = numeric::sorted(&column.iter().flatten().copied().collect::<Vec<_>>());
            let fences = Fences::from_sorted(&sorted);
            let outlier_count = fences
                .as_ref()
                .map(|f| sorted.iter().filter(|&&v| !f.contains(v)).count())
                .unwrap_or(0);
            OutlierReport {
                feature: feature.clone(),
                non_missing: sorted.len(),
                fences,
                outlier_count,
                outlier_percent: percent(outlier_count, sorted.len()),
            }
        })
        .collect())
}

/// Box plot geometry per selected feature; whiskers reach the most extreme
/// values still inside the fences. Features without values are skipped.
pub fn box_stats(table: &Table, selected: &[String]) -> Result<Vec<BoxStats>, AnalysisError> {
    let matrix = FeatureMatrix::from_table(table, selected)?;
    Ok(matrix
        .features
        .iter()
        .zip(&matrix.columns)
        .filter_map(|(feature, column)| {
            let sorted = numeric::sorted(&column.iter().flatten().copied().collect::<Vec<_>>());
            let fences = Fences::from_sorted(&sorted)?;
            let inside: Vec<f64> = sorted.iter().copied().filter(|&v| fences.contains(v)).collect();
            Some(BoxStats {
                feature: feature.clone(),
                lower_whisker: inside.first().copied().unwrap_or(fences.q1),
                q1: fences.q1,
                median: numeric::quantile_sorted(&sorted, 0.5)?,
                q3: fences.q3,
                upper_whisker: inside.last().copied().unwrap_or(fences.q3),
                outliers: sorted.iter().copied().filter(|&v| !fences.contains(v)).collect(),
            })
        })
        .collect())
}
