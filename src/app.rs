use eframe::egui;

use crate::config::AppConfig;
use crate::state::AppState;
use crate::ui::{panels, report};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct EdaApp {
    pub state: AppState,
}

impl EdaApp {
    /// Build the app and resolve the default dataset up front.
    pub fn new(config: AppConfig) -> Self {
        let mut state = AppState::new(config);
        state.load_default();
        Self { state }
    }
}

impl eframe::App for EdaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Controls edited last frame feed this frame's report.
        self.state.refresh();

        // ---- Top panel: sources ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: controls ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: report sections ----
        egui::CentralPanel::default().show(ctx, |ui| {
            report::report(ui, &mut self.state);
        });
    }
}
