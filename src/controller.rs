//! Label sync controller: keeps the scatter series, the brush selection and
//! the label column of a table in step.
//!
//! The table stays with the caller. Every operation that reads or writes rows
//! borrows it for the duration of the call only.

use crate::config::LabelOptions;
use crate::data::filter::{plottable_rows, VisibilityFilter};
use crate::data::model::{Categorical, CellValue, Column, ColumnData, ColumnKind, Table};
use crate::error::LabelError;
use crate::labels::{LabelId, LabelSet};

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Rectangle dragged out by the user, in plot coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushRect {
    pub start: [f64; 2],
    pub end: [f64; 2],
}

impl BrushRect {
    pub fn at(point: [f64; 2]) -> Self {
        Self {
            start: point,
            end: point,
        }
    }

    pub fn min(&self) -> [f64; 2] {
        [self.start[0].min(self.end[0]), self.start[1].min(self.end[1])]
    }

    pub fn max(&self) -> [f64; 2] {
        [self.start[0].max(self.end[0]), self.start[1].max(self.end[1])]
    }

    /// A click without a drag covers no area and selects nothing.
    pub fn is_degenerate(&self) -> bool {
        let (min, max) = (self.min(), self.max());
        min[0] == max[0] || min[1] == max[1]
    }

    /// Closed containment test.
    pub fn contains(&self, p: [f64; 2]) -> bool {
        let (min, max) = (self.min(), self.max());
        p[0] >= min[0] && p[0] <= max[0] && p[1] >= min[1] && p[1] <= max[1]
    }

    /// Corners in drawing order, for the overlay polygon.
    pub fn corners(&self) -> [[f64; 2]; 4] {
        let (min, max) = (self.min(), self.max());
        [min, [max[0], min[1]], max, [min[0], max[1]]]
    }
}

/// Axis ranges currently shown by the plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBounds {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl ViewBounds {
    pub fn contains(&self, p: [f64; 2]) -> bool {
        p[0] >= self.min[0] && p[0] <= self.max[0] && p[1] >= self.min[1] && p[1] <= self.max[1]
    }
}

/// How a plotted axis is scaled and labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisScale {
    Linear,
    /// Epoch milliseconds, shown as dates.
    Date,
}

/// What a primary-button drag on the plot does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Select,
    PanZoomXY,
    PanZoomX,
    PanZoomY,
}

impl InteractionMode {
    pub const ALL: [InteractionMode; 4] = [
        InteractionMode::Select,
        InteractionMode::PanZoomXY,
        InteractionMode::PanZoomX,
        InteractionMode::PanZoomY,
    ];

    pub fn title(self) -> &'static str {
        match self {
            InteractionMode::Select => "Select",
            InteractionMode::PanZoomXY => "xy",
            InteractionMode::PanZoomX => "x",
            InteractionMode::PanZoomY => "y",
        }
    }

    pub fn tooltip(self) -> &'static str {
        match self {
            InteractionMode::Select => "Select",
            InteractionMode::PanZoomXY => "Zoom/pan in x & y",
            InteractionMode::PanZoomX => "Zoom/pan in x only",
            InteractionMode::PanZoomY => "Zoom/pan in y only",
        }
    }

    /// Axes that may be dragged and zoomed, as `[x, y]`.
    pub fn pan_zoom_axes(self) -> [bool; 2] {
        match self {
            InteractionMode::Select => [false, false],
            InteractionMode::PanZoomXY => [true, true],
            InteractionMode::PanZoomX => [true, false],
            InteractionMode::PanZoomY => [false, true],
        }
    }
}

/// Zoom state. `bounds == None` means auto-fit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewState {
    pub bounds: Option<ViewBounds>,
    reset_pending: bool,
}

// ---------------------------------------------------------------------------
// Selection, series and counts
// ---------------------------------------------------------------------------

/// Sorted, duplicate-free row indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    rows: Vec<usize>,
}

impl Selection {
    pub fn from_rows(rows: impl IntoIterator<Item = usize>) -> Self {
        let mut rows: Vec<usize> = rows.into_iter().collect();
        rows.sort_unstable();
        rows.dedup();
        Self { rows }
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, row: usize) -> bool {
        self.rows.binary_search(&row).is_ok()
    }
}

/// The points of one label as drawn on screen. Point `i` is row `rows[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub label: LabelId,
    pub rows: Vec<usize>,
    pub points: Vec<[f64; 2]>,
}

/// Number of rows per label, in label order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelCounts {
    entries: Vec<(String, usize)>,
}

impl LabelCounts {
    fn tally(labels: &LabelSet, codes: &[u8]) -> Self {
        let mut counts = vec![0usize; labels.len()];
        for &code in codes {
            if let Some(n) = counts.get_mut(code as usize) {
                *n += 1;
            }
        }
        Self {
            entries: labels.names().iter().cloned().zip(counts).collect(),
        }
    }

    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(name, _)| name == label)
            .map(|&(_, n)| n)
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|&(_, n)| n).sum()
    }
}

// ---------------------------------------------------------------------------
// Label column validation
// ---------------------------------------------------------------------------

/// Codes for an existing label column, or the reason it cannot be one.
/// Missing cells take the default label.
fn existing_codes(column: &Column, labels: &LabelSet) -> Result<Vec<u8>, LabelError> {
    let default = labels.default_label().0;
    let outside = |value: String| LabelError::LabelOutsideSet {
        column: column.name.clone(),
        value,
    };
    let lookup = |value: &str| {
        labels
            .id_of(value)
            .map(|id| id.0)
            .ok_or_else(|| outside(value.to_string()))
    };

    match &column.data {
        ColumnData::Categorical(cat) => cat
            .codes
            .iter()
            .map(|&code| {
                cat.name_of(code)
                    .map_or_else(|| Err(outside(code.to_string())), lookup)
            })
            .collect(),
        ColumnData::Text(values) => values
            .iter()
            .map(|v| v.as_deref().map_or(Ok(default), lookup))
            .collect(),
        ColumnData::Bool(values) => values
            .iter()
            .map(|v| v.map_or(Ok(default), |b| lookup(if b { "true" } else { "false" })))
            .collect(),
        // Numeric labels such as `0`/`1`/`2` read back from CSV as numbers.
        ColumnData::Numeric(values) => values
            .iter()
            .map(|v| v.map_or(Ok(default), |n| lookup(&CellValue::Number(n).to_string())))
            .collect(),
        other => Err(LabelError::NotCategorical {
            column: column.name.clone(),
            kind: other.kind().to_string(),
        }),
    }
}

fn plot_scale(table: &Table, name: &str) -> Result<AxisScale, LabelError> {
    let column = table.column(name).ok_or_else(|| LabelError::UnknownColumn {
        column: name.to_string(),
    })?;
    match column.data.kind() {
        ColumnKind::Numeric => Ok(AxisScale::Linear),
        ColumnKind::DateTime => Ok(AxisScale::Date),
        other => Err(LabelError::NotPlottable {
            column: name.to_string(),
            kind: other.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// LabelController
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LabelController {
    labels: LabelSet,
    x_col: String,
    y_col: String,
    label_col: String,
    x_scale: AxisScale,
    y_scale: AxisScale,
    active: LabelId,
    brush: Option<BrushRect>,
    selection: Selection,
    visibility: VisibilityFilter,
    view: ViewState,
    interaction: InteractionMode,
    counts: LabelCounts,
}

impl LabelController {
    /// Validate `options` against `table` and prepare its label column.
    ///
    /// A missing label column is created and filled with the default label.
    /// An existing text, bool, numeric or categorical column is accepted when all of
    /// its values are labels of the set; it is then stored as categorical.
    /// Nothing in `table` changes unless construction succeeds.
    pub fn attach(table: &mut Table, options: &LabelOptions) -> Result<Self, LabelError> {
        let labels = options.label_set()?;
        let x_scale = plot_scale(table, &options.x_col)?;
        let y_scale = plot_scale(table, &options.y_col)?;

        let categories = labels.names().to_vec();
        let default = labels.default_label();
        match table.column_mut(&options.label_col) {
            Some(column) => {
                let codes = existing_codes(column, &labels)?;
                column.data = ColumnData::Categorical(Categorical { categories, codes });
            }
            None => {
                let len = table.len();
                table.push_column(Column::new(
                    options.label_col.clone(),
                    ColumnData::Categorical(Categorical::filled(categories, default.0, len)),
                ));
            }
        }

        let mut controller = Self {
            labels,
            x_col: options.x_col.clone(),
            y_col: options.y_col.clone(),
            label_col: options.label_col.clone(),
            x_scale,
            y_scale,
            active: default,
            brush: None,
            selection: Selection::default(),
            visibility: VisibilityFilter::default(),
            view: ViewState::default(),
            interaction: InteractionMode::default(),
            counts: LabelCounts::default(),
        };
        controller.on_selection_change(table)?;

        log::info!(
            "Labelling '{}' by ({}, {}) with {} labels over {} rows",
            controller.label_col,
            controller.x_col,
            controller.y_col,
            controller.labels.len(),
            table.len()
        );
        Ok(controller)
    }

    // -- accessors --

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn x_name(&self) -> &str {
        &self.x_col
    }

    pub fn y_name(&self) -> &str {
        &self.y_col
    }

    pub fn label_name(&self) -> &str {
        &self.label_col
    }

    pub fn scales(&self) -> (AxisScale, AxisScale) {
        (self.x_scale, self.y_scale)
    }

    pub fn brush(&self) -> Option<BrushRect> {
        self.brush
    }

    pub fn is_brushing(&self) -> bool {
        self.brush.is_some()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn counts(&self) -> &LabelCounts {
        &self.counts
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn visibility(&self) -> &VisibilityFilter {
        &self.visibility
    }

    // -- table access --

    fn codes<'t>(&self, table: &'t Table) -> Result<&'t [u8], LabelError> {
        let column = table
            .column(&self.label_col)
            .ok_or_else(|| LabelError::UnknownColumn {
                column: self.label_col.clone(),
            })?;
        match &column.data {
            ColumnData::Categorical(cat) => Ok(&cat.codes),
            other => Err(LabelError::NotCategorical {
                column: self.label_col.clone(),
                kind: other.kind().to_string(),
            }),
        }
    }

    fn codes_mut<'t>(&self, table: &'t mut Table) -> Result<&'t mut Vec<u8>, LabelError> {
        let column = table
            .column_mut(&self.label_col)
            .ok_or_else(|| LabelError::UnknownColumn {
                column: self.label_col.clone(),
            })?;
        match &mut column.data {
            ColumnData::Categorical(cat) => Ok(&mut cat.codes),
            other => Err(LabelError::NotCategorical {
                column: self.label_col.clone(),
                kind: other.kind().to_string(),
            }),
        }
    }

    fn plotted_rows(&self, table: &Table) -> Result<Vec<usize>, LabelError> {
        let unknown = |name: &str| LabelError::UnknownColumn {
            column: name.to_string(),
        };
        let x = table.position(&self.x_col).ok_or_else(|| unknown(&self.x_col))?;
        let y = table.position(&self.y_col).ok_or_else(|| unknown(&self.y_col))?;
        let codes = self.codes(table)?;
        Ok(plottable_rows(table, x, y, codes, &self.visibility))
    }

    fn point(&self, table: &Table, row: usize) -> Option<[f64; 2]> {
        let x = table.column(&self.x_col)?.data.coordinate(row)?;
        let y = table.column(&self.y_col)?.data.coordinate(row)?;
        Some([x, y])
    }

    // -- series --

    /// One series per label in label order, hidden labels left empty.
    pub fn series(&self, table: &Table) -> Result<Vec<ScatterSeries>, LabelError> {
        let codes = self.codes(table)?;
        let mut series: Vec<ScatterSeries> = self
            .labels
            .ids()
            .map(|label| ScatterSeries {
                label,
                rows: Vec::new(),
                points: Vec::new(),
            })
            .collect();

        for row in self.plotted_rows(table)? {
            let (Some(p), Some(s)) = (self.point(table, row), series.get_mut(codes[row] as usize))
            else {
                continue;
            };
            s.rows.push(row);
            s.points.push(p);
        }
        Ok(series)
    }

    /// Map point indices of one series back to table rows.
    pub fn globalize(series: &ScatterSeries, local: &[usize]) -> Result<Selection, LabelError> {
        let rows = local
            .iter()
            .map(|&i| {
                series.rows.get(i).copied().ok_or(LabelError::RowOutOfRange {
                    row: i,
                    len: series.rows.len(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Selection::from_rows(rows))
    }

    // -- selection --

    /// Rows whose visible point falls inside `rect`.
    pub fn select_in(&self, rect: &BrushRect, table: &Table) -> Result<Selection, LabelError> {
        if rect.is_degenerate() {
            return Ok(Selection::default());
        }
        let mut rows = Vec::new();
        for series in self.series(table)? {
            let local: Vec<usize> = series
                .points
                .iter()
                .enumerate()
                .filter(|&(_, &p)| {
                    rect.contains(p) && self.view.bounds.map_or(true, |b| b.contains(p))
                })
                .map(|(i, _)| i)
                .collect();
            rows.extend_from_slice(Self::globalize(&series, &local)?.rows());
        }
        Ok(Selection::from_rows(rows))
    }

    pub fn begin_brush(&mut self, point: [f64; 2]) {
        self.brush = Some(BrushRect::at(point));
        self.selection = Selection::default();
    }

    /// Stretch the brush to `point` and refresh the live selection.
    /// Labels are not written until the gesture finishes.
    pub fn update_brush(&mut self, point: [f64; 2], table: &Table) -> Result<(), LabelError> {
        let Some(brush) = self.brush.as_mut() else {
            return Ok(());
        };
        brush.end = point;
        let rect = *brush;
        self.selection = self.select_in(&rect, table)?;
        self.on_selection_change(table)
    }

    /// End the gesture and label the brushed rows with the active label.
    pub fn finish_brush(&mut self, table: &mut Table) -> Result<usize, LabelError> {
        if self.brush.take().is_none() {
            return Ok(0);
        }
        let selection = self.selection.clone();
        self.on_brush_end(table, &selection)
    }

    /// Drop the gesture without writing anything.
    pub fn cancel_brush(&mut self) {
        self.brush = None;
        self.selection = Selection::default();
    }

    /// Write the active label into every selected row.
    ///
    /// Ignored while a brush gesture is still in progress, so a half-drawn
    /// rectangle never relabels rows. Returns the number of rows written.
    pub fn on_brush_end(&mut self, table: &mut Table, selection: &Selection) -> Result<usize, LabelError> {
        if self.is_brushing() || selection.is_empty() {
            return Ok(0);
        }

        let active = self.active.0;
        let codes = self.codes_mut(table)?;
        let len = codes.len();
        if let Some(&row) = selection.rows().iter().find(|&&row| row >= len) {
            return Err(LabelError::RowOutOfRange { row, len });
        }
        for &row in selection.rows() {
            codes[row] = active;
        }

        log::debug!(
            "Labelled {} rows as '{}'",
            selection.len(),
            self.labels.name(self.active)
        );
        self.on_selection_change(table)?;
        Ok(selection.len())
    }

    /// Recount rows per label.
    pub fn on_selection_change(&mut self, table: &Table) -> Result<(), LabelError> {
        self.counts = LabelCounts::tally(&self.labels, self.codes(table)?);
        Ok(())
    }

    /// Summary shown under the plot, one `label: count` line per label.
    pub fn summary_text(&self) -> String {
        let mut lines: Vec<String> = self
            .counts
            .entries()
            .iter()
            .map(|(name, n)| format!("{name}: {n}"))
            .collect();
        if !self.selection.is_empty() {
            lines.push(format!("brushed: {}", self.selection.len()));
        }
        lines.join("\n")
    }

    // -- active label, visibility, interaction --

    pub fn active_label(&self) -> LabelId {
        self.active
    }

    pub fn set_active_label(&mut self, label: LabelId) {
        if label.index() < self.labels.len() {
            self.active = label;
        } else {
            log::warn!("Ignoring unknown label {label}");
        }
    }

    pub fn set_visible(&mut self, label: LabelId, visible: bool) {
        self.visibility.set_visible(label, visible);
        self.cancel_brush();
    }

    /// Show or hide every label at once.
    pub fn set_all_visible(&mut self, visible: bool) {
        if visible {
            self.visibility.show_all();
        } else {
            self.visibility.hide_all(&self.labels);
        }
        self.cancel_brush();
    }

    pub fn interaction(&self) -> InteractionMode {
        self.interaction
    }

    pub fn set_interaction(&mut self, mode: InteractionMode) {
        if mode != InteractionMode::Select {
            self.cancel_brush();
        }
        self.interaction = mode;
    }

    // -- view --

    /// Clear any zoom/pan back to auto-fit.
    pub fn reset_view(&mut self) {
        self.view.bounds = None;
        self.view.reset_pending = true;
    }

    /// Whether the renderer still has to apply a reset. Clears the request.
    pub fn take_reset(&mut self) -> bool {
        std::mem::take(&mut self.view.reset_pending)
    }

    /// Record the bounds the plot is currently showing.
    pub fn observe_bounds(&mut self, bounds: ViewBounds) {
        self.view.bounds = Some(bounds);
    }
}
