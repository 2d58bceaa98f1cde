use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::LabelOptions;
use crate::data::{loader, writer};
use crate::data::model::Table;
use crate::view::{label, LabelView};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded table (None until user loads a file).
    pub table: Option<Table>,

    /// Where the table came from, offered again on save.
    pub source_path: Option<PathBuf>,

    /// Options of the active labelling view.
    pub options: LabelOptions,

    /// Options being edited in the side panel, applied on demand.
    pub draft: LabelOptions,

    /// Comma separated labels as typed in the side panel.
    pub labels_text: String,

    /// Labelling view over `table`, when the options fit it.
    pub view: Option<LabelView>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_options(LabelOptions::default())
    }
}

impl AppState {
    pub fn with_options(options: LabelOptions) -> Self {
        Self {
            table: None,
            source_path: None,
            labels_text: options.labels_text(),
            draft: options.clone(),
            options,
            view: None,
            status_message: None,
        }
    }

    /// Ingest a newly loaded table and open a view with the current options.
    pub fn set_table(&mut self, table: Table, source: Option<PathBuf>) {
        self.table = Some(table);
        self.source_path = source;
        self.status_message = None;
        self.rebuild_view();
    }

    /// Load a table from disk, reporting failures in the status line.
    pub fn open_path(&mut self, path: &Path) {
        match loader::load_file(path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} rows with columns {:?}",
                    table.len(),
                    table.column_names().collect::<Vec<_>>()
                );
                self.set_table(table, Some(path.to_path_buf()));
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Save the labelled table.
    pub fn save_to(&mut self, path: &Path) -> Result<()> {
        let table = self.table.as_ref().context("no table loaded")?;
        writer::save_file(table, path)
            .with_context(|| format!("saving {}", path.display()))?;
        log::info!("Saved {} rows to {}", table.len(), path.display());
        self.status_message = Some(format!("Saved to {}", path.display()));
        Ok(())
    }

    /// Take the edited options and rebuild the view.
    pub fn apply_draft(&mut self) {
        self.draft.set_labels_text(&self.labels_text);
        self.options = self.draft.clone();
        self.rebuild_view();
    }

    /// Reopen the labelling view with `self.options`.
    pub fn rebuild_view(&mut self) {
        let Some(table) = self.table.as_mut() else {
            self.view = None;
            return;
        };
        match label(table, &self.options) {
            Ok(view) => {
                self.view = Some(view);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Cannot label table: {e}");
                self.view = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("points.csv");
        std::fs::write(&path, "x,y\n0,0\n1,1\n2,4\n").unwrap();
        path
    }

    #[test]
    fn opening_a_file_builds_a_view() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::default();
        state.open_path(&write_csv(&dir));

        assert!(state.status_message.is_none());
        let view = state.view.as_ref().unwrap();
        assert_eq!(view.title, "nblabeller");
        assert_eq!(view.controller.counts().get("false"), Some(3));
        assert!(state.table.as_ref().unwrap().column("selected").is_some());
    }

    #[test]
    fn pandas_bool_label_column_opens_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pandas.csv");
        std::fs::write(&path, "x,y,selected\n0,0,False\n1,1,True\n").unwrap();
        let mut state = AppState::default();
        state.open_path(&path);

        assert!(state.status_message.is_none());
        let counts = state.view.as_ref().unwrap().controller.counts();
        assert_eq!(counts.get("false"), Some(1));
        assert_eq!(counts.get("true"), Some(1));
    }

    #[test]
    fn bad_options_report_and_drop_the_view() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::default();
        state.open_path(&write_csv(&dir));

        state.draft.x_col = "nope".into();
        state.apply_draft();
        assert!(state.view.is_none());
        assert!(state.status_message.as_deref().unwrap().contains("nope"));

        state.draft.x_col = "x".into();
        state.labels_text = "a, b, a".into();
        state.apply_draft();
        assert!(state.view.is_none());
        assert!(state.status_message.as_deref().unwrap().contains("more than once"));
    }

    #[test]
    fn missing_file_sets_status() {
        let mut state = AppState::default();
        state.open_path(Path::new("/definitely/not/here.csv"));
        assert!(state.table.is_none());
        assert!(state.status_message.unwrap().starts_with("Error"));
    }

    #[test]
    fn save_without_table_fails() {
        let mut state = AppState::default();
        assert!(state.save_to(Path::new("out.csv")).is_err());
    }
}
