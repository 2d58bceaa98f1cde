use std::ops::RangeInclusive;

use eframe::egui::{Color32, PointerButton, Stroke, Ui};
use egui_plot::{GridMark, Legend, MarkerShape, Plot, PlotPoint, Points, Polygon};

use crate::controller::{AxisScale, InteractionMode, ViewBounds};
use crate::data::model::{format_datetime, Table};
use crate::view::LabelView;

// ---------------------------------------------------------------------------
// Brush gestures read from the plot response
// ---------------------------------------------------------------------------

enum Gesture {
    Start([f64; 2]),
    Drag([f64; 2]),
    End,
}

fn date_axis(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    format_datetime(mark.value as i64)
}

fn format_coordinate(value: f64, scale: AxisScale) -> String {
    match scale {
        AxisScale::Linear => format!("{value:.2}"),
        AxisScale::Date => format_datetime(value as i64),
    }
}

// ---------------------------------------------------------------------------
// Scatter plot (central panel)
// ---------------------------------------------------------------------------

/// Render the scatter plot, one series per label, and drive brushing.
pub fn scatter_plot(ui: &mut Ui, view: &mut LabelView, table: &mut Table) {
    let ctrl = &mut view.controller;

    let series = match ctrl.series(table) {
        Ok(series) => series,
        Err(e) => {
            ui.colored_label(Color32::RED, format!("Error: {e}"));
            return;
        }
    };

    let mode = ctrl.interaction();
    let pan_zoom = mode.pan_zoom_axes();
    let (x_scale, y_scale) = ctrl.scales();
    let (x_name, y_name) = (ctrl.x_name().to_string(), ctrl.y_name().to_string());

    let mut plot = Plot::new("scatter_plot")
        .legend(Legend::default())
        .x_axis_label(x_name.clone())
        .y_axis_label(y_name.clone())
        .allow_boxed_zoom(false)
        .allow_drag(pan_zoom)
        .allow_scroll(pan_zoom)
        .allow_zoom(pan_zoom)
        .allow_double_click_reset(true)
        .label_formatter(move |name, value: &PlotPoint| {
            let x = format_coordinate(value.x, x_scale);
            let y = format_coordinate(value.y, y_scale);
            if name.is_empty() {
                format!("{x_name}: {x}\n{y_name}: {y}")
            } else {
                format!("{name}\n{x_name}: {x}\n{y_name}: {y}")
            }
        });
    if x_scale == AxisScale::Date {
        plot = plot.x_axis_formatter(date_axis);
    }
    if y_scale == AxisScale::Date {
        plot = plot.y_axis_formatter(date_axis);
    }
    if ctrl.take_reset() {
        plot = plot.reset();
    }

    let labels = ctrl.labels().clone();
    let colors = &view.colors;
    let brush = ctrl.brush();
    let selection = ctrl.selection().clone();
    let active = ctrl.active_label();

    let response = plot.show(ui, |plot_ui| {
        for s in &series {
            plot_ui.points(
                Points::new(s.points.clone())
                    .name(labels.name(s.label))
                    .color(colors.color_for(s.label))
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(2.5),
            );
        }

        // Ring the rows of the current selection.
        let ringed: Vec<[f64; 2]> = series
            .iter()
            .flat_map(|s| s.rows.iter().zip(&s.points))
            .filter(|(row, _)| selection.contains(**row))
            .map(|(_, &p)| p)
            .collect();
        if !ringed.is_empty() {
            plot_ui.points(
                Points::new(ringed)
                    .color(Color32::BLACK)
                    .filled(false)
                    .radius(4.5),
            );
        }

        if let Some(rect) = brush {
            let (fill, stroke) = colors.brush_colors(active);
            plot_ui.polygon(
                Polygon::new(rect.corners().to_vec())
                    .fill_color(fill)
                    .stroke(Stroke::new(1.0, stroke)),
            );
        }

        let mut gesture = None;
        if mode == InteractionMode::Select {
            let pointer = plot_ui.pointer_coordinate().map(|p| [p.x, p.y]);
            let resp = plot_ui.response();
            if resp.drag_started_by(PointerButton::Primary) {
                gesture = pointer.map(Gesture::Start);
            } else if resp.dragged_by(PointerButton::Primary) {
                gesture = pointer.map(Gesture::Drag);
            }
            if resp.drag_stopped_by(PointerButton::Primary) {
                gesture = Some(Gesture::End);
            }
        }

        let bounds = plot_ui.plot_bounds();
        (
            ViewBounds {
                min: bounds.min(),
                max: bounds.max(),
            },
            gesture,
        )
    });

    let (bounds, gesture) = response.inner;
    ctrl.observe_bounds(bounds);

    let outcome = match gesture {
        Some(Gesture::Start(p)) => {
            ctrl.begin_brush(p);
            Ok(())
        }
        Some(Gesture::Drag(p)) => ctrl.update_brush(p, table),
        Some(Gesture::End) => ctrl.finish_brush(table).map(|n| {
            if n > 0 {
                log::info!(
                    "Labelled {n} rows as '{}'",
                    ctrl.labels().name(ctrl.active_label())
                );
            }
        }),
        None => Ok(()),
    };
    if let Err(e) = outcome {
        log::error!("Brush update failed: {e}");
        ctrl.cancel_brush();
    }
}
