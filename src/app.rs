use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RustyApexApp {
    pub state: AppState,
}

impl eframe::App for RustyApexApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Keyboard series navigation ----
        if self.state.controller.is_some() && !ctx.wants_keyboard_input() {
            let (prev, next) = ctx.input(|i| {
                (i.key_pressed(egui::Key::PageUp), i.key_pressed(egui::Key::PageDown))
            });
            if prev {
                self.state.prev_series();
            }
            if next {
                self.state.next_series();
            }
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: parameters, series, summary ----
        egui::SidePanel::left("control_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: CCS plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::ccs_plot(ui, &mut self.state);
        });
    }
}
