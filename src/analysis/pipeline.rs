use super::correlation::{self, CorrelationMatrix, CorrelationPair};
use super::missing::{self, MissingReport};
use super::numeric::numeric_columns;
use super::outlier::{self, BoxStats, OutlierReport};
use super::pairplot::{self, PairPlotData};
use super::pca::{self, PcaProjection};
use super::profile::{self, ColumnProfile, Overview, SummaryTable, ValueCount};
use super::standardize::{self, StandardizedMatrix};
use crate::config::AppConfig;
use crate::data::model::Table;
use crate::data::preview::{self, PreviewMode, preview_bounds};
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Control values
// ---------------------------------------------------------------------------

/// How standardized data is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StdDisplay {
    #[default]
    StandardizedOnly,
    SideBySide,
}

/// Every user-controlled input of the pipeline, as plain values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Controls {
    pub preview_rows: usize,
    pub preview_mode: PreviewMode,
    /// Re-rolled when the user asks for a fresh random sample.
    pub preview_seed: u64,
    pub std_display: StdDisplay,
    pub std_rows: usize,
    /// Features for box plots and outlier statistics.
    pub outlier_features: Vec<String>,
}

impl Controls {
    /// Defaults for a freshly loaded table: 10 preview rows (clamped), head
    /// mode, and the first four numeric features selected for outliers.
    pub fn for_table(table: &Table) -> Self {
        let rows = preview_bounds(table.n_rows()).default;
        Controls {
            preview_rows: rows,
            preview_mode: PreviewMode::Head,
            preview_seed: 0,
            std_display: StdDisplay::StandardizedOnly,
            std_rows: rows,
            outlier_features: numeric_columns(table).into_iter().take(4).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outputs of the numeric sections. Each is independently fallible.
#[derive(Debug, Clone)]
pub struct NumericAnalysis {
    pub features: Vec<String>,
    pub correlation: Result<CorrelationMatrix, AnalysisError>,
    pub top_pairs: Vec<CorrelationPair>,
    pub standardized: Result<StandardizedMatrix, AnalysisError>,
    /// Original numeric values for the side-by-side view.
    pub original_head: Table,
    pub std_display: StdDisplay,
    pub pca: Result<PcaProjection, AnalysisError>,
    pub outliers: Result<Vec<OutlierReport>, AnalysisError>,
    pub boxes: Result<Vec<BoxStats>, AnalysisError>,
    pub pair_plot_available: bool,
}

/// Everything the dashboard renders for one table + control state.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub overview: Overview,
    /// Value counts for the configured categorical columns that exist.
    pub categories: Vec<(String, Vec<ValueCount>)>,
    pub profiles: Vec<ColumnProfile>,
    pub preview: Table,
    pub numeric_summary: Result<SummaryTable, AnalysisError>,
    pub full_summary: Result<SummaryTable, AnalysisError>,
    pub missing: MissingReport,
    /// `Err(EmptyNumericSet)` skips every numeric section at once.
    pub numeric: Result<NumericAnalysis, AnalysisError>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Full synchronous recomputation for the current table and controls.
pub fn run(table: &Table, controls: &Controls, config: &AppConfig) -> Analysis {
    log::debug!(
        "recomputing analysis for {} rows x {} columns",
        table.n_rows(),
        table.n_cols()
    );

    let categories = config
        .category_columns
        .iter()
        .filter_map(|c| profile::value_counts(table, c).map(|counts| (c.clone(), counts)))
        .collect();

    let analysis = Analysis {
        overview: profile::overview(table),
        categories,
        profiles: profile::profile(table),
        preview: preview::preview(
            table,
            controls.preview_rows,
            controls.preview_mode,
            controls.preview_seed,
        ),
        numeric_summary: profile::summarize(table, true),
        full_summary: profile::summarize(table, false),
        missing: missing::missing_report(table),
        numeric: run_numeric(table, controls, config),
    };

    if let Err(e) = &analysis.numeric {
        log::warn!("numeric sections skipped: {e}");
    }
    analysis
}

fn run_numeric(
    table: &Table,
    controls: &Controls,
    config: &AppConfig,
) -> Result<NumericAnalysis, AnalysisError> {
    let features = super::numeric::require_numeric(table)?;

    let correlation = correlation::correlate(table, &features);
    let top_pairs = correlation
        .as_ref()
        .map(|m| correlation::top_pairs(m, config.top_pairs))
        .unwrap_or_default();

    let standardized = standardize::standardize(table, &features);
    let pca = standardized.clone().and_then(|s| pca::reduce(&s));

    // selections may refer to columns of a previous dataset
    let selected: Vec<String> = controls
        .outlier_features
        .iter()
        .filter(|f| features.contains(f))
        .cloned()
        .collect();
    let (outliers, boxes) = if selected.is_empty() {
        (Ok(Vec::new()), Ok(Vec::new()))
    } else {
        (
            outlier::analyze(table, &selected),
            outlier::box_stats(table, &selected),
        )
    };

    for (section, result) in [
        ("correlation", correlation.as_ref().err()),
        ("standardization", standardized.as_ref().err()),
        ("pca", pca.as_ref().err()),
        ("outliers", outliers.as_ref().err()),
    ] {
        if let Some(e) = result {
            log::warn!("{section} failed: {e}");
        }
    }

    let std_rows = preview_bounds(table.n_rows()).clamp(controls.std_rows);
    Ok(NumericAnalysis {
        original_head: table.select(&features).head(std_rows),
        std_display: controls.std_display,
        pair_plot_available: pairplot::pair_plot_available(
            features.len(),
            config.pairplot_max_features,
        ),
        features,
        correlation,
        top_pairs,
        standardized,
        pca,
        outliers,
        boxes,
    })
}

/// On-demand pair plot. Only offered for 2..=`pairplot_max_features`
/// numeric features.
pub fn run_pair_plot(table: &Table, config: &AppConfig) -> Result<PairPlotData, AnalysisError> {
    let features = super::numeric::require_numeric(table)?;
    if !pairplot::pair_plot_available(features.len(), config.pairplot_max_features) {
        return Err(AnalysisError::VisualizationFailure(format!(
            "pair plot needs 2 to {} numeric features, found {}",
            config.pairplot_max_features,
            features.len()
        )));
    }
    pairplot::pair_plot(table, &features, config.pairplot_max_features)
}
