use std::sync::Arc;

use crate::analysis::pairplot::PairPlotData;
use crate::analysis::pipeline::{self, Analysis, Controls};
use crate::config::AppConfig;
use crate::data::model::Table;
use crate::data::source::{DataSource, DatasetLoader, LoadOutcome};
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Resolves and memoizes datasets for this session.
    loader: DatasetLoader,

    /// Loaded dataset (None until a source resolves).
    pub dataset: Option<Arc<Table>>,

    /// Human-readable origin of `dataset`.
    pub origin: Option<String>,

    /// Current control values. Edited in place by the panels.
    pub controls: Controls,

    /// Controls the cached `analysis` was computed with.
    analyzed_controls: Option<Controls>,

    /// Pipeline output for `dataset` + `analyzed_controls`.
    pub analysis: Option<Analysis>,

    /// On-demand pair plot; cleared whenever the dataset changes.
    pub pair_plot: Option<Result<PairPlotData, AnalysisError>>,

    /// Text typed into the URL box.
    pub url_input: String,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            loader: DatasetLoader::new(&config),
            config,
            dataset: None,
            origin: None,
            controls: Controls::default(),
            analyzed_controls: None,
            analysis: None,
            pair_plot: None,
            url_input: String::new(),
            status_message: None,
        }
    }

    /// Resolve the default dataset (remote, then local fallback).
    pub fn load_default(&mut self) {
        let outcome = self.loader.load_default();
        self.apply_default(outcome);
    }

    /// Re-fetch the default dataset, bypassing the memo cache.
    pub fn reload_default(&mut self) {
        let outcome = self.loader.reload_default();
        self.apply_default(outcome);
    }

    fn apply_default(&mut self, outcome: LoadOutcome) {
        match outcome {
            LoadOutcome::Loaded { table, origin } => {
                self.set_dataset(table, origin);
            }
            LoadOutcome::Failed { attempts } => {
                let reasons: Vec<String> = attempts
                    .iter()
                    .map(|(source, e)| format!("{source}: {e}"))
                    .collect();
                log::error!("Default dataset unavailable: {}", reasons.join("; "));
                self.clear_dataset();
                self.status_message = Some(format!(
                    "Could not load the default dataset. {}",
                    reasons.join("; ")
                ));
            }
        }
    }

    /// A single direct attempt at a user-supplied source. On failure the
    /// current dataset (if any) stays in place.
    pub fn load_source(&mut self, source: DataSource) {
        let origin = source.to_string();
        match self.loader.load(source) {
            Ok(table) => self.set_dataset(table, origin),
            Err(e) => {
                log::error!("Failed to load {origin}: {e}");
                self.status_message = Some(format!("Error loading {origin}: {e}"));
            }
        }
    }

    /// Ingest a newly loaded dataset and reset the controls for it.
    pub fn set_dataset(&mut self, table: Arc<Table>, origin: String) {
        let unchanged = self
            .dataset
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &table));
        if !unchanged {
            self.controls = Controls::for_table(&table);
            self.analysis = None;
            self.analyzed_controls = None;
            self.pair_plot = None;
        }
        self.dataset = Some(table);
        self.origin = Some(origin);
        self.status_message = None;
    }

    fn clear_dataset(&mut self) {
        self.dataset = None;
        self.origin = None;
        self.analysis = None;
        self.analyzed_controls = None;
        self.pair_plot = None;
    }

    /// Recompute the analysis if the dataset or any control changed since
    /// the last run. Returns whether a recomputation happened.
    pub fn refresh(&mut self) -> bool {
        let Some(table) = &self.dataset else {
            return false;
        };
        if self.analysis.is_some() && self.analyzed_controls.as_ref() == Some(&self.controls) {
            return false;
        }
        self.analysis = Some(pipeline::run(table, &self.controls, &self.config));
        self.analyzed_controls = Some(self.controls.clone());
        true
    }

    /// Build the pair plot for the current dataset.
    pub fn build_pair_plot(&mut self) {
        if let Some(table) = &self.dataset {
            let result = pipeline::run_pair_plot(table, &self.config);
            if let Err(e) = &result {
                log::warn!("pair plot failed: {e}");
            }
            self.pair_plot = Some(result);
        }
    }

    /// Toggle a feature in the outlier selection, keeping table order.
    pub fn toggle_outlier_feature(&mut self, feature: &str) {
        let selected = &mut self.controls.outlier_features;
        if let Some(pos) = selected.iter().position(|f| f == feature) {
            selected.remove(pos);
        } else if let Some(table) = &self.dataset {
            selected.push(feature.to_string());
            let order = table.column_names();
            selected.sort_by_key(|f| order.iter().position(|o| o == f));
        }
    }
}
