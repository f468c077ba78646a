use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::analysis::missing::MissingReport;
use crate::analysis::pairplot::PairPlotData;
use crate::analysis::pipeline::{Analysis, NumericAnalysis, StdDisplay};
use crate::error::AnalysisError;
use crate::state::AppState;
use crate::ui::{plot, tables};

const WARN: Color32 = Color32::from_rgb(230, 150, 0);

fn warning(ui: &mut Ui, text: impl Into<String>) {
    ui.label(RichText::new(format!("⚠ {}", text.into())).color(WARN));
}

fn section(ui: &mut Ui, title: &str, add_contents: impl FnOnce(&mut Ui)) {
    egui::CollapsingHeader::new(RichText::new(title).heading())
        .default_open(true)
        .show(ui, add_contents);
    ui.add_space(8.0);
}

// ---------------------------------------------------------------------------
// Central report
// ---------------------------------------------------------------------------

/// Render the scrolling analysis report for the current dataset.
pub fn report(ui: &mut Ui, state: &mut AppState) {
    let Some(analysis) = &state.analysis else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No data loaded  (File → Open…, a URL, or Reload default dataset)");
        });
        return;
    };

    let mut want_pair_plot = false;
    ScrollArea::vertical()
        .id_salt("report_scroll")
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            overview(ui, analysis);
            section(ui, "2. Raw data preview", |ui| {
                ui.label(format!("{} rows", analysis.preview.n_rows()));
                tables::data_table(ui, "preview_table", &analysis.preview);
            });
            section(ui, "3. Column information", |ui| {
                tables::profile_table(ui, &analysis.profiles);
            });
            summaries(ui, analysis);
            missing(ui, &analysis.missing);

            match &analysis.numeric {
                Ok(numeric) => {
                    want_pair_plot = numeric_sections(
                        ui,
                        numeric,
                        state.pair_plot.as_ref(),
                        state.config.pairplot_max_features,
                    );
                }
                Err(AnalysisError::EmptyNumericSet) => {
                    section(ui, "6. Numeric analysis", |ui| {
                        warning(
                            ui,
                            "The dataset has no numeric features. Correlation, standardization, \
                             PCA and outlier sections are skipped.",
                        );
                    });
                }
                Err(e) => {
                    section(ui, "6. Numeric analysis", |ui| warning(ui, e.to_string()));
                }
            }
        });

    if want_pair_plot {
        state.build_pair_plot();
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

fn overview(ui: &mut Ui, analysis: &Analysis) {
    section(ui, "1. Dataset overview", |ui| {
        let o = &analysis.overview;
        tables::metric_row(
            ui,
            &[
                ("Species (rows)", o.rows.to_string()),
                ("Columns", o.columns.to_string()),
                ("Numeric columns", o.numeric_columns.to_string()),
                ("Missing data", format!("{:.2}%", o.missing_percent)),
            ],
        );

        if analysis.categories.is_empty() {
            return;
        }
        ui.separator();
        ui.strong("Category distributions");
        ui.columns(analysis.categories.len(), |cols: &mut [Ui]| {
            for (ui, (column, counts)) in cols.iter_mut().zip(&analysis.categories) {
                ui.label(RichText::new(column).strong());
                plot::category_bars(ui, column, counts);
                tables::value_count_table(ui, ("value_counts", column), counts);
            }
        });
    });
}

fn summaries(ui: &mut Ui, analysis: &Analysis) {
    section(ui, "4. Summary statistics", |ui| {
        ui.strong("Numeric columns");
        match &analysis.numeric_summary {
            Ok(summary) => tables::summary_table(ui, "numeric_summary", summary),
            Err(e) => warning(ui, e.to_string()),
        }
        egui::CollapsingHeader::new("All columns")
            .id_salt("full_summary")
            .show(ui, |ui: &mut Ui| match &analysis.full_summary {
                Ok(summary) => tables::summary_table(ui, "full_summary_table", summary),
                Err(e) => warning(ui, e.to_string()),
            });
    });
}

fn missing(ui: &mut Ui, report: &MissingReport) {
    section(ui, "5. Missing values", |ui| match report {
        MissingReport::Complete => {
            ui.label(
                RichText::new("✅ No missing values in the dataset.").color(Color32::DARK_GREEN),
            );
        }
        MissingReport::Missing { total, entries } => {
            ui.label(format!("{total} missing cells across {} columns.", entries.len()));
            plot::missing_bars(ui, entries);
            tables::missing_table(ui, entries);
        }
    });
}

/// Sections 6–10. Returns true when the pair plot was requested.
fn numeric_sections(
    ui: &mut Ui,
    numeric: &NumericAnalysis,
    pair_plot: Option<&Result<PairPlotData, AnalysisError>>,
    max_features: usize,
) -> bool {
    section(ui, "6. Numeric features", |ui| {
        ui.label(format!("{} numeric features:", numeric.features.len()));
        ui.label(RichText::new(numeric.features.join(", ")).monospace());
    });

    section(ui, "7. Correlation analysis", |ui| match &numeric.correlation {
        Ok(matrix) => {
            plot::correlation_heatmap(ui, matrix);
            ui.add_space(6.0);
            if numeric.top_pairs.is_empty() {
                ui.label("At least two numeric features are needed for correlation pairs.");
            } else {
                ui.strong(format!("Top {} correlated pairs", numeric.top_pairs.len()));
                tables::pairs_table(ui, &numeric.top_pairs);
            }
        }
        Err(e) => warning(ui, e.to_string()),
    });

    section(ui, "8. Standardized data", |ui| match &numeric.standardized {
        Ok(scaled) => {
            let rows = scaled.head_rows(numeric.original_head.n_rows());
            standardized_view(ui, numeric, &scaled.features, &rows);
            egui::CollapsingHeader::new("Scaling parameters")
                .id_salt("scaler_stats")
                .show(ui, |ui: &mut Ui| tables::scaler_table(ui, &scaled.stats));
        }
        Err(e) => warning(ui, e.to_string()),
    });

    section(ui, "9. Principal component analysis", |ui| match &numeric.pca {
        Ok(pca) => {
            tables::metric_row(
                ui,
                &[
                    ("PC1 variance", format!("{:.2}%", pca.variance_ratio[0] * 100.0)),
                    ("PC2 variance", format!("{:.2}%", pca.variance_ratio[1] * 100.0)),
                    ("Total explained", format!("{:.2}%", pca.total_ratio() * 100.0)),
                    ("Rows projected", pca.row_indices.len().to_string()),
                ],
            );
            plot::pca_scatter(ui, pca);
        }
        Err(e) => warning(ui, e.to_string()),
    });

    let mut requested = false;
    section(ui, "10. Outlier analysis", |ui| {
        match (&numeric.boxes, &numeric.outliers) {
            (Ok(boxes), Ok(reports)) if !reports.is_empty() => {
                plot::box_plots(ui, boxes);
                tables::outlier_table(ui, reports);
            }
            (Ok(_), Ok(_)) => {
                ui.label("Select at least one feature in the side panel to see box plots.");
            }
            (Err(e), _) | (_, Err(e)) => warning(ui, e.to_string()),
        }

        ui.separator();
        ui.strong("Pairwise relationships");
        if !numeric.pair_plot_available {
            ui.label(format!(
                "The pair plot needs 2 to {max_features} numeric features; this dataset has {}.",
                numeric.features.len()
            ));
            return;
        }
        requested = ui.button("Draw pair plot").clicked();
        match pair_plot {
            Some(Ok(data)) => {
                ui.label(format!("{} complete rows", data.n_rows()));
                plot::pair_plot_grid(ui, data);
            }
            Some(Err(e)) => warning(ui, e.to_string()),
            None => {}
        }
    });
    requested
}

fn standardized_view(
    ui: &mut Ui,
    numeric: &NumericAnalysis,
    features: &[String],
    rows: &[Vec<Option<f64>>],
) {
    match numeric.std_display {
        StdDisplay::StandardizedOnly => {
            tables::numeric_rows_table(ui, "standardized_rows", features, rows);
        }
        StdDisplay::SideBySide => {
            ui.columns(2, |cols: &mut [Ui]| {
                cols[0].strong("Original");
                tables::data_table(&mut cols[0], "original_rows", &numeric.original_head);
                cols[1].strong("Standardized");
                tables::numeric_rows_table(&mut cols[1], "standardized_rows", features, rows);
            });
        }
    }
}
