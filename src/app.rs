use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ScatterLabelApp {
    pub state: AppState,
}

impl Default for ScatterLabelApp {
    fn default() -> Self {
        Self {
            state: AppState::default(),
        }
    }
}

impl ScatterLabelApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for ScatterLabelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let state = &mut self.state;

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, state);
        });

        // ---- Left side panel: options ----
        egui::SidePanel::left("options_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, state);
            });

        // ---- Bottom panel: row preview ----
        if let (Some(view), Some(tbl)) = (&state.view, &state.table) {
            egui::TopBottomPanel::bottom("preview_panel")
                .default_height(180.0)
                .resizable(true)
                .show(ctx, |ui| {
                    table::preview_table(ui, view, tbl);
                });
        }

        // ---- Central panel: plot and label controls ----
        egui::CentralPanel::default().show(ctx, |ui| match (&mut state.view, &mut state.table) {
            (Some(view), Some(tbl)) => view.show(ui, tbl),
            (None, Some(_)) => {
                ui.centered_and_justified(|ui| {
                    ui.heading("Adjust the options on the left and press Apply");
                });
            }
            _ => {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open a table to start labelling  (File → Open…)");
                });
            }
        });
    }
}
