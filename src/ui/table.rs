use eframe::egui::{RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::model::Table;
use crate::view::LabelView;

/// Rows shown when nothing is brushed.
const PREVIEW_ROWS: usize = 50;

// ---------------------------------------------------------------------------
// Bottom panel – preview of brushed rows
// ---------------------------------------------------------------------------

/// Rows to list: the current selection, else the head of the table.
fn preview_rows(view: &LabelView, table: &Table) -> Vec<usize> {
    let selection = view.controller.selection();
    if selection.is_empty() {
        (0..table.len().min(PREVIEW_ROWS)).collect()
    } else {
        selection.rows().to_vec()
    }
}

/// Render the row index, plotted columns and label of the previewed rows.
pub fn preview_table(ui: &mut Ui, view: &LabelView, table: &Table) {
    let ctrl = &view.controller;
    let names = [ctrl.x_name(), ctrl.y_name(), ctrl.label_name()];
    let columns: Vec<_> = names.iter().map(|n| table.column(n)).collect();
    let rows = preview_rows(view, table);

    let caption = if ctrl.selection().is_empty() {
        format!("First {} rows", rows.len())
    } else {
        format!("{} brushed rows", rows.len())
    };
    ui.strong(caption);

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(TableColumn::auto().at_least(48.0))
        .columns(TableColumn::remainder().at_least(80.0), names.len())
        .header(20.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("row");
            });
            for name in names {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let r = rows[row.index()];
                row.col(|ui: &mut Ui| {
                    ui.label(r.to_string());
                });
                for (i, column) in columns.iter().enumerate() {
                    row.col(|ui: &mut Ui| {
                        let text = column
                            .map(|c| c.data.cell(r).to_string())
                            .unwrap_or_default();
                        if i == 2 {
                            let color = ctrl
                                .labels()
                                .id_of(&text)
                                .map(|id| view.colors.color_for(id));
                            match color {
                                Some(c) => ui.label(RichText::new(text).color(c)),
                                None => ui.label(text),
                            };
                        } else {
                            ui.label(text);
                        }
                    });
                }
            });
        });
}
