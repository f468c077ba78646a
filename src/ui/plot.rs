use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, RichText, Sense, Stroke, Ui, Vec2};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, HLine, Legend, Plot, PlotPoints, Points,
    VLine,
};

use crate::analysis::correlation::CorrelationMatrix;
use crate::analysis::missing::MissingEntry;
use crate::analysis::outlier::BoxStats;
use crate::analysis::pairplot::{Histogram, PairPlotData};
use crate::analysis::pca::PcaProjection;
use crate::analysis::profile::ValueCount;
use crate::color;

/// Axis text for integer positions of a categorical axis.
fn category_label(labels: &[String], mark: GridMark) -> String {
    let i = mark.value.round();
    if (mark.value - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    labels.get(i as usize).cloned().unwrap_or_default()
}

fn static_plot(id_salt: impl std::hash::Hash) -> Plot<'static> {
    Plot::new(id_salt)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
}

// ---------------------------------------------------------------------------
// Categorical distributions
// ---------------------------------------------------------------------------

/// Vertical bar chart of value counts, one colour per category.
pub fn category_bars(ui: &mut Ui, column: &str, counts: &[ValueCount]) {
    let palette = color::generate_palette(counts.len());
    let bars: Vec<Bar> = counts
        .iter()
        .zip(palette)
        .enumerate()
        .map(|(i, (c, fill))| {
            Bar::new(i as f64, c.count as f64)
                .name(&c.label)
                .fill(fill)
                .width(0.7)
        })
        .collect();
    let labels: Vec<String> = counts.iter().map(|c| c.label.clone()).collect();

    static_plot(("category_bars", column))
        .height(220.0)
        .y_axis_label("count")
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark))
        .show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars).name(column)));
}

// ---------------------------------------------------------------------------
// Missingness
// ---------------------------------------------------------------------------

/// Horizontal bars of missing percentage, most missing on top.
pub fn missing_bars(ui: &mut Ui, entries: &[MissingEntry]) {
    let n = entries.len();
    let bars: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            Bar::new((n - 1 - i) as f64, e.percent)
                .name(&e.column)
                .fill(color::heat(e.percent / 100.0))
                .width(0.7)
        })
        .collect();
    let labels: Vec<String> = entries.iter().rev().map(|e| e.column.clone()).collect();

    static_plot("missing_bars")
        .height((28.0 * n as f32).clamp(120.0, 400.0))
        .x_axis_label("missing %")
        .include_x(0.0)
        .y_axis_formatter(move |mark, _range| category_label(&labels, mark))
        .show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars).horizontal()));
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

/// Lower-triangle heatmap (diagonal included) with coefficient labels.
pub fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let n = matrix.len();
    if n == 0 {
        return;
    }
    let cell = if n > 8 { 38.0 } else { 52.0 };
    let label_w = 150.0;
    let size = Vec2::new(label_w + cell * n as f32, cell * n as f32 + 20.0);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min;
    let font = FontId::proportional(11.0);
    let text_color = ui.visuals().text_color();

    let cell_rect = |i: usize, j: usize| {
        Rect::from_min_size(
            Pos2::new(origin.x + label_w + cell * j as f32, origin.y + cell * i as f32),
            Vec2::splat(cell),
        )
    };

    for i in 0..n {
        painter.text(
            Pos2::new(origin.x + label_w - 6.0, origin.y + cell * (i as f32 + 0.5)),
            Align2::RIGHT_CENTER,
            format!("{}. {}", i + 1, matrix.features[i]),
            font.clone(),
            text_color,
        );
        for j in 0..=i {
            let rect = cell_rect(i, j).shrink(1.0);
            let value = matrix.get(i, j);
            painter.rect_filled(rect, 2.0, color::diverging(value));
            let label = value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"));
            painter.text(rect.center(), Align2::CENTER_CENTER, label, font.clone(), Color32::BLACK);
        }
    }
    for j in 0..n {
        painter.text(
            Pos2::new(
                origin.x + label_w + cell * (j as f32 + 0.5),
                origin.y + cell * n as f32 + 10.0,
            ),
            Align2::CENTER_CENTER,
            (j + 1).to_string(),
            font.clone(),
            text_color,
        );
    }

    let hovered = response.hover_pos().and_then(|pos| {
        let j = ((pos.x - origin.x - label_w) / cell).floor();
        let i = ((pos.y - origin.y) / cell).floor();
        if j < 0.0 || i < 0.0 {
            return None;
        }
        let (i, j) = (i as usize, j as usize);
        (i < n && j <= i).then(|| {
            let r = matrix
                .get(i, j)
                .map_or_else(|| "undefined".to_string(), |v| format!("{v:.4}"));
            format!("{} × {}: r = {r}", matrix.features[i], matrix.features[j])
        })
    });
    if let Some(text) = hovered {
        response.on_hover_text(text);
    }
}

// ---------------------------------------------------------------------------
// PCA
// ---------------------------------------------------------------------------

const ROW_BUCKETS: usize = 8;

/// PC1 vs PC2 scatter, coloured by original row index.
pub fn pca_scatter(ui: &mut Ui, pca: &PcaProjection) {
    let max_row = pca.row_indices.last().copied().unwrap_or(0).max(1) as f64;
    let mut buckets: Vec<Vec<[f64; 2]>> = vec![Vec::new(); ROW_BUCKETS];
    for ((&row, &x), &y) in pca.row_indices.iter().zip(&pca.pc1).zip(&pca.pc2) {
        let b = ((row as f64 / max_row) * ROW_BUCKETS as f64) as usize;
        buckets[b.min(ROW_BUCKETS - 1)].push([x, y]);
    }

    Plot::new("pca_scatter")
        .height(380.0)
        .legend(Legend::default())
        .x_axis_label(format!("PC1 ({:.1}%)", pca.variance_ratio[0] * 100.0))
        .y_axis_label(format!("PC2 ({:.1}%)", pca.variance_ratio[1] * 100.0))
        .show(ui, |plot_ui| {
            plot_ui.hline(HLine::new(0.0).color(Color32::GRAY).width(0.5));
            plot_ui.vline(VLine::new(0.0).color(Color32::GRAY).width(0.5));
            let step = max_row / ROW_BUCKETS as f64;
            for (b, points) in buckets.into_iter().enumerate() {
                if points.is_empty() {
                    continue;
                }
                let lo = (b as f64 * step).ceil();
                let hi = ((b + 1) as f64 * step).floor();
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(format!("rows {lo}–{hi}"))
                        .color(color::sequential((b as f64 + 0.5) / ROW_BUCKETS as f64))
                        .radius(3.0)
                        .filled(true),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Box plots
// ---------------------------------------------------------------------------

/// One small box-and-whisker plot per feature, outliers drawn as points.
pub fn box_plots(ui: &mut Ui, boxes: &[BoxStats]) {
    let palette = color::generate_palette(boxes.len());
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (b, stroke_color) in boxes.iter().zip(palette) {
            ui.vertical(|ui: &mut Ui| {
                ui.label(RichText::new(&b.feature).strong());
                let elem = BoxElem::new(
                    0.0,
                    BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker),
                )
                .name(&b.feature)
                .box_width(0.5)
                .fill(stroke_color.gamma_multiply(0.4))
                .stroke(Stroke::new(1.5, stroke_color));
                let outliers: Vec<[f64; 2]> = b.outliers.iter().map(|&v| [0.0, v]).collect();

                static_plot(("box_plot", &b.feature))
                    .width(200.0)
                    .height(240.0)
                    .show_x(false)
                    .show(ui, |plot_ui| {
                        plot_ui.box_plot(BoxPlot::new(vec![elem]));
                        if !outliers.is_empty() {
                            plot_ui.points(
                                Points::new(PlotPoints::from(outliers))
                                    .name("outliers")
                                    .color(Color32::RED)
                                    .radius(2.5),
                            );
                        }
                    });
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Pair plot
// ---------------------------------------------------------------------------

fn histogram_bars(hist: &Histogram, fill: Color32) -> Vec<Bar> {
    hist.counts
        .iter()
        .zip(hist.edges.windows(2))
        .map(|(&count, edge)| {
            Bar::new((edge[0] + edge[1]) / 2.0, count as f64)
                .width((edge[1] - edge[0]).max(f64::EPSILON))
                .fill(fill)
        })
        .collect()
}

/// Scatter matrix: scatter off the diagonal, histograms on it.
pub fn pair_plot_grid(ui: &mut Ui, data: &PairPlotData) {
    const CELL: f32 = 150.0;
    let n = data.features.len();
    let palette = color::generate_palette(n);

    egui::ScrollArea::horizontal()
        .id_salt("pair_plot_scroll")
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("pair_plot_grid")
                .spacing([4.0, 4.0])
                .show(ui, |ui: &mut Ui| {
                    ui.label("");
                    for f in &data.features {
                        ui.label(RichText::new(f).small().strong());
                    }
                    ui.end_row();

                    for i in 0..n {
                        ui.label(RichText::new(&data.features[i]).small().strong());
                        for j in 0..n {
                            let cell = static_plot(("pair_plot", i, j))
                                .width(CELL)
                                .height(CELL)
                                .show_axes(false)
                                .show_grid(false);
                            if i == j {
                                let bars = histogram_bars(&data.histograms[i], palette[i]);
                                cell.show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars)));
                            } else {
                                let points: Vec<[f64; 2]> = data.columns[j]
                                    .iter()
                                    .zip(&data.columns[i])
                                    .map(|(&x, &y)| [x, y])
                                    .collect();
                                cell.show(ui, |plot_ui| {
                                    plot_ui.points(
                                        Points::new(PlotPoints::from(points))
                                            .color(palette[j])
                                            .radius(1.5),
                                    )
                                });
                            }
                        }
                        ui.end_row();
                    }
                });
        });
}
