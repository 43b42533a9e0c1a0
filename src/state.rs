use std::path::{Path, PathBuf};

use crate::color::IntensityColorMap;
use crate::data::calibration::process;
use crate::data::loader::{load_file, load_processed, save_table};
use crate::data::model::FeatureTable;
use crate::data::params::{CalibrationParams, ParamInputs};
use crate::data::stats::StatValue;
use crate::error::CcsError;
use crate::series::{SeriesController, SeriesUpdate};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Parameter fields as typed by the user.
    pub inputs: ParamInputs,

    /// Series controller over the processed table (None until a file is
    /// loaded).
    pub controller: Option<SeriesController>,

    /// Colour map of the base layer.
    pub color_map: Option<IntensityColorMap>,

    /// Summary rows of the current selection.
    pub summary: Vec<(&'static str, StatValue)>,

    /// File the current table came from.
    pub source_path: Option<PathBuf>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            inputs: ParamInputs::default(),
            controller: None,
            color_map: None,
            summary: Vec::new(),
            source_path: None,
            status_message: Some("Ready".to_string()),
        }
    }
}

impl AppState {
    /// Parse parameters, load a raw export and process it. On any failure
    /// the current table is kept.
    pub fn open_raw(&mut self, path: &Path) {
        let params = match self.inputs.parse() {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Rejected parameters: {e}");
                self.status_message = Some(format!("Invalid value for parameters: {e}"));
                return;
            }
        };

        let raw = match load_file(path) {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error reading file: {e:#}"));
                return;
            }
        };

        match process(&raw, &params) {
            Ok(table) => {
                self.set_table(table, path);
                self.status_message = Some(format!("Loaded {}", path.display()));
            }
            Err(CcsError::EmptyResult) => {
                log::warn!("No matching points in {}", path.display());
                self.status_message =
                    Some(format!("No matching data points found in: {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to process {}: {e}", path.display());
                self.status_message =
                    Some(format!("Error processing file {}: {e}", path.display()));
            }
        }
    }

    /// Resume a session from a previously saved table.
    pub fn open_processed(&mut self, path: &Path) {
        match load_processed(path) {
            Ok(table) if table.is_empty() => {
                self.status_message =
                    Some(format!("No matching data points found in: {}", path.display()));
            }
            Ok(table) => {
                self.set_table(table, path);
                self.status_message = Some(format!("Resumed {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to load processed table: {e:#}");
                self.status_message = Some(format!("Error reading file: {e:#}"));
            }
        }
    }

    /// Commit the current series and write the table.
    pub fn save(&mut self, path: &Path) {
        let Some(ctl) = self.controller.as_mut() else {
            self.status_message = Some("Nothing to save".to_string());
            return;
        };
        match ctl.commit() {
            Ok(update) => self.summary = update.stats,
            Err(e) => {
                self.status_message = Some(format!("Error: {e}"));
                return;
            }
        }
        match save_table(ctl.table(), path) {
            Ok(()) => self.status_message = Some(format!("Saved to file {}", path.display())),
            Err(e) => {
                log::error!("Failed to save: {e:#}");
                self.status_message = Some(format!("Unable to write file: {e:#}"));
            }
        }
    }

    /// Replace the table wholesale and reset to series 1.
    fn set_table(&mut self, table: FeatureTable, path: &Path) {
        log::info!("{} points ready from {}", table.len(), path.display());
        self.color_map = Some(IntensityColorMap::for_table(&table));
        let ctl = SeriesController::new(table);
        self.summary = ctl.stats();
        self.controller = Some(ctl);
        self.source_path = Some(path.to_path_buf());
    }

    pub fn toggle_point(&mut self, index: usize) {
        let result = match self.controller.as_mut() {
            Some(ctl) => ctl.toggle_point(index),
            None => return,
        };
        self.apply(result.map(Some));
    }

    pub fn switch_series(&mut self, series: u32) {
        let result = match self.controller.as_mut() {
            Some(ctl) if ctl.current_series() != series => ctl.switch_series(series),
            _ => return,
        };
        self.apply(result.map(Some));
    }

    pub fn next_series(&mut self) {
        let result = match self.controller.as_mut() {
            Some(ctl) => ctl.next_series(),
            None => return,
        };
        self.apply(result.map(Some));
    }

    pub fn prev_series(&mut self) {
        let result = match self.controller.as_mut() {
            Some(ctl) => ctl.prev_series(),
            None => return,
        };
        self.apply(result);
    }

    /// The plot is immediate mode and repaints from `plan().draw_order()`
    /// every frame, so the render commands are only traced here.
    fn apply(&mut self, result: Result<Option<SeriesUpdate>, CcsError>) {
        match result {
            Ok(Some(update)) => {
                for command in &update.commands {
                    log::debug!("render: {command:?}");
                }
                self.summary = update.stats;
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!("{e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    pub fn load_params(&mut self, path: &Path) {
        match CalibrationParams::load_json(path) {
            Ok(params) => {
                self.inputs = ParamInputs::from_params(&params);
                self.status_message = Some(format!("Parameters loaded from {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to load parameters: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    pub fn save_params(&mut self, path: &Path) {
        let result = self
            .inputs
            .parse()
            .map_err(anyhow::Error::from)
            .and_then(|params| params.save_json(path));
        match result {
            Ok(()) => self.status_message = Some(format!("Parameters saved to {}", path.display())),
            Err(e) => {
                log::error!("Failed to save parameters: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
