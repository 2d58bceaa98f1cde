use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::controller::InteractionMode;
use crate::state::AppState;
use crate::view::LabelView;

// ---------------------------------------------------------------------------
// Left side panel – option editor
// ---------------------------------------------------------------------------

fn column_combo(ui: &mut Ui, id: &str, value: &mut String, columns: &[String]) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(value.as_str())
        .show_ui(ui, |ui: &mut Ui| {
            for col in columns {
                ui.selectable_value(value, col.clone(), col);
            }
        });
}

/// Render the left options panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Options");
    ui.separator();

    let columns: Vec<String> = match &state.table {
        Some(table) => table.column_names().map(str::to_string).collect(),
        None => {
            ui.label("No table loaded.");
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("options_grid")
                .num_columns(2)
                .spacing([8.0, 6.0])
                .show(ui, |ui: &mut Ui| {
                    ui.strong("x");
                    column_combo(ui, "x_col", &mut state.draft.x_col, &columns);
                    ui.end_row();

                    ui.strong("y");
                    column_combo(ui, "y_col", &mut state.draft.y_col, &columns);
                    ui.end_row();

                    // Free text: a new name creates a fresh label column.
                    ui.strong("Label column");
                    ui.text_edit_singleline(&mut state.draft.label_col);
                    ui.end_row();

                    ui.strong("Labels");
                    ui.text_edit_singleline(&mut state.labels_text)
                        .on_hover_text("Comma separated, at most 10");
                    ui.end_row();

                    ui.strong("Default");
                    ui.text_edit_singleline(&mut state.draft.default_label);
                    ui.end_row();

                    ui.strong("Title");
                    ui.text_edit_singleline(&mut state.draft.title);
                    ui.end_row();
                });

            ui.add_space(6.0);
            if ui.button("Apply").clicked() {
                state.apply_draft();
            }
        });
}

// ---------------------------------------------------------------------------
// Label controls under the plot
// ---------------------------------------------------------------------------

/// Interaction toggles, zoom reset, active label, visibility and counts.
pub fn label_controls(ui: &mut Ui, view: &mut LabelView) {
    let ctrl = &mut view.controller;

    ui.horizontal(|ui: &mut Ui| {
        for mode in InteractionMode::ALL {
            if ui
                .selectable_label(ctrl.interaction() == mode, mode.title())
                .on_hover_text(mode.tooltip())
                .clicked()
            {
                ctrl.set_interaction(mode);
            }
        }

        ui.separator();

        if ui
            .button("Reset zoom")
            .on_hover_text("Reset zoom")
            .clicked()
        {
            ctrl.reset_view();
        }
    });

    let labels = ctrl.labels().clone();

    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Label as");
        let active = ctrl.active_label();
        egui::ComboBox::from_id_salt("active_label")
            .selected_text(RichText::new(labels.name(active)).color(view.colors.color_for(active)))
            .show_ui(ui, |ui: &mut Ui| {
                for id in labels.ids() {
                    let text = RichText::new(labels.name(id)).color(view.colors.color_for(id));
                    if ui.selectable_label(id == active, text).clicked() {
                        ctrl.set_active_label(id);
                    }
                }
            });
    });

    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.strong("Show");
        if ui.small_button("All").clicked() {
            ctrl.set_all_visible(true);
        }
        if ui.small_button("None").clicked() {
            ctrl.set_all_visible(false);
        }
        for (id, (name, color)) in labels.ids().zip(view.colors.legend_entries(&labels)) {
            let mut visible = ctrl.visibility().is_visible(id);
            if ui
                .checkbox(&mut visible, RichText::new(name).color(color))
                .changed()
            {
                ctrl.set_visible(id, visible);
            }
        }
    });

    ui.separator();
    for line in ctrl.summary_text().lines() {
        ui.label(line);
    }
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
            let can_save = state.table.is_some();
            if ui
                .add_enabled(can_save, egui::Button::new("Save as…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            let brushed = state
                .view
                .as_ref()
                .map_or(0, |v| v.controller.selection().len());
            ui.label(format!("{} rows loaded, {brushed} brushed", table.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
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
        .set_title("Open table")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Save labelled table")
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"]);
    if let Some(name) = state
        .source_path
        .as_ref()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
    {
        dialog = dialog.set_file_name(name);
    }

    if let Some(path) = dialog.save_file() {
        if let Err(e) = state.save_to(&path) {
            log::error!("Failed to save file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
