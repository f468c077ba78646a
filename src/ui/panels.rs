use bytes::Bytes;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::analysis::numeric::numeric_columns;
use crate::analysis::pipeline::StdDisplay;
use crate::data::preview::{PreviewMode, preview_bounds};
use crate::data::source::DataSource;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – control widgets
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Settings");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds.clone(),
        None => {
            ui.label(RichText::new("❌ No dataset loaded").color(Color32::RED));
            ui.label("Open a file or URL from the top bar.");
            return;
        }
    };

    ui.label(RichText::new("✅ Dataset loaded").color(Color32::DARK_GREEN));
    ui.small(format!("{} species (rows)", dataset.n_rows()));
    if let Some(origin) = &state.origin {
        ui.small(origin);
    }
    ui.separator();

    let bounds = preview_bounds(dataset.n_rows());
    let numeric = numeric_columns(&dataset);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Raw data preview ----
            ui.strong("Raw data preview");
            ui.add(
                egui::Slider::new(&mut state.controls.preview_rows, bounds.min..=bounds.max)
                    .text("rows"),
            );
            egui::ComboBox::from_id_salt("preview_mode")
                .selected_text(state.controls.preview_mode.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for mode in PreviewMode::ALL {
                        ui.selectable_value(&mut state.controls.preview_mode, mode, mode.label());
                    }
                });
            if state.controls.preview_mode == PreviewMode::RandomSample
                && ui.small_button("New sample").clicked()
            {
                state.controls.preview_seed = state.controls.preview_seed.wrapping_add(1);
            }
            ui.separator();

            // ---- Standardized data display ----
            ui.strong("Standardized data");
            ui.radio_value(
                &mut state.controls.std_display,
                StdDisplay::StandardizedOnly,
                "Standardized only",
            );
            ui.radio_value(
                &mut state.controls.std_display,
                StdDisplay::SideBySide,
                "Original vs standardized",
            );
            ui.add(
                egui::Slider::new(&mut state.controls.std_rows, bounds.min..=bounds.max)
                    .text("rows"),
            );
            ui.separator();

            // ---- Outlier feature selection ----
            let n_selected = state.controls.outlier_features.len();
            let header = format!("Box plot features  ({n_selected}/{})", numeric.len());
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("outlier_features")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    if numeric.is_empty() {
                        ui.label("No numeric features.");
                    }
                    for feature in &numeric {
                        let mut checked = state.controls.outlier_features.contains(feature);
                        if ui.checkbox(&mut checked, feature).changed() {
                            state.toggle_outlier_feature(feature);
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload default dataset").clicked() {
                state.reload_default();
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label("URL:");
        let response = ui.add(
            egui::TextEdit::singleline(&mut state.url_input)
                .hint_text("https://…/data.csv")
                .desired_width(320.0),
        );
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if (ui.button("Load").clicked() || submitted) && !state.url_input.trim().is_empty() {
            let url = state.url_input.trim().to_string();
            state.load_source(DataSource::Url(url));
        }

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!("{} rows × {} columns", ds.n_rows(), ds.n_cols()));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open dataset")
        .add_filter("Supported files", &["csv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    let Some(path) = file else {
        return;
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    match std::fs::read(&path) {
        Ok(raw) => state.load_source(DataSource::Upload {
            name,
            bytes: Bytes::from(raw),
        }),
        Err(e) => {
            log::error!("Failed to read {}: {e}", path.display());
            state.status_message = Some(format!("Error reading {name}: {e}"));
        }
    }
}
