use std::collections::BTreeSet;

use super::model::Table;
use crate::labels::{LabelId, LabelSet};

// ---------------------------------------------------------------------------
// Label visibility: which label series are drawn and selectable
// ---------------------------------------------------------------------------

/// Set of labels whose points are hidden. Empty means "show everything".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityFilter {
    hidden: BTreeSet<LabelId>,
}

impl VisibilityFilter {
    pub fn is_visible(&self, label: LabelId) -> bool {
        !self.hidden.contains(&label)
    }

    pub fn set_visible(&mut self, label: LabelId, visible: bool) {
        if visible {
            self.hidden.remove(&label);
        } else {
            self.hidden.insert(label);
        }
    }

    /// Show every label again.
    pub fn show_all(&mut self) {
        self.hidden.clear();
    }

    /// Hide every label of `set`.
    pub fn hide_all(&mut self, set: &LabelSet) {
        self.hidden = set.ids().collect();
    }
}

/// Return indices of rows that can be drawn: both coordinates present and
/// the row's label visible.
///
/// A row passes when:
/// * its x and y cells hold a finite number or a datetime
/// * its label code (one per row, from the label column) is not hidden
pub fn plottable_rows(
    table: &Table,
    x_col: usize,
    y_col: usize,
    codes: &[u8],
    filter: &VisibilityFilter,
) -> Vec<usize> {
    let columns = table.columns();
    let (x, y) = (&columns[x_col].data, &columns[y_col].data);

    codes
        .iter()
        .enumerate()
        .filter(|&(row, &code)| {
            filter.is_visible(LabelId(code)) && x.coordinate(row).is_some() && y.coordinate(row).is_some()
        })
        .map(|(row, _)| row)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, ColumnData};

    fn table() -> Table {
        Table::from_columns(vec![
            Column::new("x", ColumnData::Numeric(vec![Some(0.0), None, Some(2.0), Some(3.0)])),
            Column::new("y", ColumnData::Numeric(vec![Some(0.0), Some(1.0), Some(2.0), Some(3.0)])),
        ])
        .unwrap()
    }

    #[test]
    fn drops_missing_coordinates() {
        let codes = vec![0; 4];
        let rows = plottable_rows(&table(), 0, 1, &codes, &VisibilityFilter::default());
        assert_eq!(rows, vec![0, 2, 3]);
    }

    #[test]
    fn hidden_labels_are_not_plottable() {
        let codes = vec![0, 0, 1, 0];
        let mut filter = VisibilityFilter::default();
        filter.set_visible(LabelId(1), false);
        assert_eq!(plottable_rows(&table(), 0, 1, &codes, &filter), vec![0, 3]);

        filter.show_all();
        assert!(filter.is_visible(LabelId(1)));
    }

    #[test]
    fn hide_all_hides_every_label() {
        let set = LabelSet::new(["a", "b"], "a").unwrap();
        let mut filter = VisibilityFilter::default();
        filter.hide_all(&set);
        assert!(!filter.is_visible(LabelId(0)));
        assert!(!filter.is_visible(LabelId(1)));
    }
}
