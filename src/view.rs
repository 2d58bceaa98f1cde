use eframe::egui::{self, Ui};

use crate::color::LabelColors;
use crate::config::LabelOptions;
use crate::controller::LabelController;
use crate::data::model::Table;
use crate::error::LabelError;
use crate::ui::{panels, plot};

/// Space kept below the plot for the label controls and summary.
const CONTROLS_HEIGHT: f32 = 170.0;

// ---------------------------------------------------------------------------
// LabelView – plot + controls + summary for one table
// ---------------------------------------------------------------------------

/// The composed labelling widget.
pub struct LabelView {
    pub controller: LabelController,
    pub colors: LabelColors,
    pub title: String,
}

/// Build a labelling view over `table`.
///
/// The label column named in `options` is created (or validated and
/// converted) here; every other column is left as it is.
pub fn label(table: &mut Table, options: &LabelOptions) -> Result<LabelView, LabelError> {
    let controller = LabelController::attach(table, options)?;
    let colors = LabelColors::new(controller.labels());
    Ok(LabelView {
        controller,
        colors,
        title: options.title.clone(),
    })
}

impl LabelView {
    /// Render the title, the scatter plot and the controls beneath it.
    pub fn show(&mut self, ui: &mut Ui, table: &mut Table) {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.heading(&self.title);
        });

        let plot_height = (ui.available_height() - CONTROLS_HEIGHT).max(200.0);
        ui.allocate_ui(egui::vec2(ui.available_width(), plot_height), |ui: &mut Ui| {
            plot::scatter_plot(ui, self, table);
        });

        ui.separator();
        panels::label_controls(ui, self);
    }
}
