use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::series_legend;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – parameters, series navigation, summary
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Parameters");
            ui.separator();
            parameter_grid(ui, state);

            ui.add_space(8.0);
            ui.heading("Series");
            ui.separator();
            series_controls(ui, state);

            ui.add_space(8.0);
            ui.heading("Selection");
            ui.separator();
            summary_table(ui, state);
        });
}

fn parameter_grid(ui: &mut Ui, state: &mut AppState) {
    let inputs = &mut state.inputs;
    let fields: [(&str, &mut String); 10] = [
        ("Neutral mass (Da)", &mut inputs.neutral_mass),
        ("Mass accuracy (ppm)", &mut inputs.ppm),
        ("Min charge", &mut inputs.min_charge),
        ("Max charge", &mut inputs.max_charge),
        ("Calibration a", &mut inputs.a),
        ("Calibration b", &mut inputs.b),
        ("Calibration X", &mut inputs.x),
        ("Transfer C", &mut inputs.c),
        ("Pusher delay (µs)", &mut inputs.push),
        ("Gas mass (Da)", &mut inputs.gas),
    ];

    egui::Grid::new("parameters")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            for (label, value) in fields {
                ui.label(label);
                ui.add(egui::TextEdit::singleline(value).desired_width(90.0));
                ui.end_row();
            }
        });
    ui.small("Parameters apply on the next file load.");
}

fn series_controls(ui: &mut Ui, state: &mut AppState) {
    let Some(ctl) = &state.controller else {
        ui.label("No dataset loaded.");
        return;
    };
    let current = ctl.current_series();
    let max = ctl.known_max_series();

    let mut requested = current;
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("◀").on_hover_text("Previous series (Page Up)").clicked() {
            requested = current.saturating_sub(1).max(1);
        }
        ui.add(DragValue::new(&mut requested).range(1..=max));
        if ui.button("▶").on_hover_text("Next series (Page Down)").clicked() {
            requested = current.saturating_add(1);
        }
    });

    let mut shown = ctl.plan().series();
    if let Err(pos) = shown.binary_search(&current) {
        shown.insert(pos, current);
    }
    for (label, color) in series_legend(shown) {
        let text = if label == format!("Series {current}") {
            RichText::new(label).color(color).strong()
        } else {
            RichText::new(label).color(color)
        };
        ui.label(text);
    }

    if requested != current {
        state.switch_series(requested);
    }
}

fn summary_table(ui: &mut Ui, state: &AppState) {
    if state.summary.is_empty() {
        ui.label("—");
        return;
    }
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto())
        .column(Column::remainder())
        .body(|mut body| {
            for (label, value) in &state.summary {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(*label);
                    });
                    row.col(|ui| {
                        ui.label(value.to_string());
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open export…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Resume processed…").clicked() {
                resume_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.controller.is_some(), egui::Button::new("Save processed…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Load parameters…").clicked() {
                if let Some(path) = json_dialog().pick_file() {
                    state.load_params(&path);
                }
                ui.close_menu();
            }
            if ui.button("Save parameters…").clicked() {
                if let Some(path) = json_dialog().save_file() {
                    state.save_params(&path);
                }
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.menu_button("Series", |ui: &mut Ui| {
            if ui.button("Previous series").clicked() {
                state.prev_series();
                ui.close_menu();
            }
            if ui.button("Next series").clicked() {
                state.next_series();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ctl) = &state.controller {
            ui.label(format!(
                "{} points, series {}",
                ctl.table().len(),
                ctl.current_series()
            ));
            ui.separator();
        }

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") || msg.starts_with("Invalid") || msg.starts_with("Unable") {
                Color32::RED
            } else {
                ui.visuals().text_color()
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open Apex3D export")
        .add_filter("Supported files", &["csv", "tsv", "txt", "parquet", "pq", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Tab-delimited", &["tsv", "txt"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.open_raw(&path);
    }
}

pub fn resume_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Resume processed table")
        .add_filter("Processed table", &["csv", "tsv", "txt"])
        .pick_file();

    if let Some(path) = file {
        state.open_processed(&path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Store result in")
        .add_filter("Processed table", &["csv", "tsv", "txt"])
        .save_file();

    if let Some(path) = file {
        state.save(&path);
    }
}

fn json_dialog() -> rfd::FileDialog {
    rfd::FileDialog::new()
        .set_title("Calibration parameters")
        .add_filter("JSON", &["json"])
}
