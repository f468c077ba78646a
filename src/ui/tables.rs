use std::hash::Hash;

use eframe::egui::{Align, Layout, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::analysis::correlation::CorrelationPair;
use crate::analysis::missing::MissingEntry;
use crate::analysis::outlier::OutlierReport;
use crate::analysis::profile::{ColumnProfile, SummaryTable, ValueCount};
use crate::analysis::standardize::ScalerStats;
use crate::color;
use crate::data::model::Table;

const ROW_HEIGHT: f32 = 18.0;
const MAX_HEIGHT: f32 = 320.0;

/// Scrollable striped grid. `row_cells(i)` yields one entry per header.
fn grid(
    ui: &mut Ui,
    id_salt: impl Hash,
    headers: &[String],
    n_rows: usize,
    mut row_cells: impl FnMut(usize) -> Vec<RichText>,
) {
    if headers.is_empty() {
        return;
    }
    ui.push_id(id_salt, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(Layout::left_to_right(Align::Center))
            .columns(TableColumn::auto().at_least(60.0), headers.len())
            .max_scroll_height(MAX_HEIGHT)
            .header(ROW_HEIGHT + 2.0, |mut header| {
                for h in headers {
                    header.col(|ui: &mut Ui| {
                        ui.strong(h);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, n_rows, |mut row| {
                    let cells = row_cells(row.index());
                    for cell in cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell);
                        });
                    }
                });
            });
    });
}

fn num(v: f64) -> RichText {
    RichText::new(format!("{v:.4}")).monospace()
}

fn opt_num(v: Option<f64>) -> RichText {
    match v {
        Some(v) => num(v),
        None => RichText::new("NaN").weak(),
    }
}

fn labels<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names.iter().map(|n| n.as_ref().to_string()).collect()
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Raw rows of a table.
pub fn data_table(ui: &mut Ui, id_salt: impl Hash, table: &Table) {
    grid(ui, id_salt, &table.column_names(), table.n_rows(), |r| {
        table.row_text(r).into_iter().map(RichText::new).collect()
    });
}

/// Statistics as rows, columns as columns (the `describe` layout).
pub fn summary_table(ui: &mut Ui, id_salt: impl Hash, summary: &SummaryTable) {
    let mut head = vec![String::new()];
    head.extend(summary.columns.iter().cloned());
    grid(ui, id_salt, &head, summary.statistics.len(), |r| {
        let mut cells = vec![RichText::new(&summary.statistics[r]).strong()];
        cells.extend(summary.cells[r].iter().map(|c| match c {
            Some(cell) => RichText::new(cell.to_string()).monospace(),
            None => RichText::new("NaN").weak(),
        }));
        cells
    });
}

/// Per-column types, null counts and memory.
pub fn profile_table(ui: &mut Ui, profiles: &[ColumnProfile]) {
    let head = labels(&[
        "Column", "Type", "Nulls", "Null %", "Unique", "Example", "Memory (KB)",
    ]);
    grid(ui, "profile_table", &head, profiles.len(), |r| {
        let p = &profiles[r];
        vec![
            RichText::new(&p.name).strong(),
            RichText::new(p.dtype.to_string()),
            RichText::new(p.null_count.to_string()),
            RichText::new(format!("{:.2}", p.null_percent))
                .color(color::heat(p.null_percent / 100.0)),
            RichText::new(p.n_unique.to_string()),
            RichText::new(&p.example),
            RichText::new(format!("{:.2}", p.memory_kb)),
        ]
    });
}

pub fn missing_table(ui: &mut Ui, entries: &[MissingEntry]) {
    let head = labels(&["Column", "Missing", "Missing %"]);
    grid(ui, "missing_table", &head, entries.len(), |r| {
        let e = &entries[r];
        vec![
            RichText::new(&e.column),
            RichText::new(e.count.to_string()),
            RichText::new(format!("{:.2}", e.percent)).color(color::heat(e.percent / 100.0)),
        ]
    });
}

pub fn value_count_table(ui: &mut Ui, id_salt: impl Hash, counts: &[ValueCount]) {
    let head = labels(&["Value", "Count", "%"]);
    grid(ui, id_salt, &head, counts.len(), |r| {
        let c = &counts[r];
        vec![
            RichText::new(&c.label),
            RichText::new(c.count.to_string()),
            RichText::new(format!("{:.1}", c.percent)),
        ]
    });
}

pub fn pairs_table(ui: &mut Ui, pairs: &[CorrelationPair]) {
    let head = labels(&["Feature A", "Feature B", "r", "|r|"]);
    grid(ui, "pairs_table", &head, pairs.len(), |r| {
        let p = &pairs[r];
        vec![
            RichText::new(&p.feature_a),
            RichText::new(&p.feature_b),
            num(p.coefficient).color(color::diverging(Some(p.coefficient))),
            num(p.abs_coefficient),
        ]
    });
}

/// Mean and std each feature was scaled with.
pub fn scaler_table(ui: &mut Ui, stats: &[ScalerStats]) {
    let head = labels(&["Feature", "Mean", "Std"]);
    grid(ui, "scaler_table", &head, stats.len(), |r| {
        let s = &stats[r];
        vec![RichText::new(&s.feature), num(s.mean), num(s.std)]
    });
}

/// Row-major numeric values with feature headers.
pub fn numeric_rows_table(
    ui: &mut Ui,
    id_salt: impl Hash,
    features: &[String],
    rows: &[Vec<Option<f64>>],
) {
    grid(ui, id_salt, features, rows.len(), |r| {
        rows[r].iter().map(|v| opt_num(*v)).collect()
    });
}

pub fn outlier_table(ui: &mut Ui, reports: &[OutlierReport]) {
    let head = labels(&[
        "Feature", "Non-missing", "Q1", "Q3", "IQR", "Lower", "Upper", "Outliers", "Outlier %",
    ]);
    grid(ui, "outlier_table", &head, reports.len(), |r| {
        let rep = &reports[r];
        let mut cells = vec![
            RichText::new(&rep.feature).strong(),
            RichText::new(rep.non_missing.to_string()),
        ];
        match &rep.fences {
            Some(f) => cells.extend([
                num(f.q1),
                num(f.q3),
                num(f.iqr),
                num(f.lower_bound),
                num(f.upper_bound),
            ]),
            None => cells.extend((0..5).map(|_| RichText::new("NaN").weak())),
        }
        cells.push(RichText::new(rep.outlier_count.to_string()));
        cells.push(
            RichText::new(format!("{:.2}", rep.outlier_percent))
                .color(color::heat(rep.outlier_percent / 100.0)),
        );
        cells
    });
}

/// Label + value pair laid out like a dashboard metric.
pub fn metric(ui: &mut Ui, label: &str, value: impl Into<String>) {
    ui.group(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.label(RichText::new(label).small().weak());
            ui.label(RichText::new(value.into()).heading());
        });
    });
}

pub fn metric_row(ui: &mut Ui, metrics: &[(&str, String)]) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (label, value) in metrics {
            metric(ui, label, value.clone());
        }
    });
    ui.add_space(4.0);
}
