use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::LabelError;
use crate::labels::LabelSet;

// ---------------------------------------------------------------------------
// LabelOptions – everything needed to open a labelling session
// ---------------------------------------------------------------------------

/// Which columns to plot and label, and with which labels.
///
/// Missing fields fall back to [`LabelOptions::default`], so an options file
/// may name only what differs:
///
/// ```json
/// { "x_col": "age", "y_col": "income", "labels": ["low", "mid", "high"], "default_label": "mid" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelOptions {
    pub x_col: String,
    pub y_col: String,
    pub label_col: String,
    pub labels: Vec<String>,
    pub default_label: String,
    pub title: String,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            x_col: "x".to_string(),
            y_col: "y".to_string(),
            label_col: "selected".to_string(),
            labels: vec!["false".to_string(), "true".to_string()],
            default_label: "false".to_string(),
            title: "nblabeller".to_string(),
        }
    }
}

impl LabelOptions {
    /// Read options from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading options file {}", path.display()))?;
        serde_json::from_str(&text).context("parsing options JSON")
    }

    /// Build the validated label set these options describe.
    pub fn label_set(&self) -> Result<LabelSet, LabelError> {
        LabelSet::new(self.labels.iter().cloned(), &self.default_label)
    }

    /// Labels as a single comma separated string, for the option editor.
    pub fn labels_text(&self) -> String {
        self.labels.join(", ")
    }

    /// Replace the labels from comma separated text. Blank entries are skipped.
    pub fn set_labels_text(&mut self, text: &str) {
        self.labels = text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let opts: LabelOptions =
            serde_json::from_str(r#"{ "x_col": "age", "title": "people" }"#).unwrap();
        assert_eq!(opts.x_col, "age");
        assert_eq!(opts.y_col, "y");
        assert_eq!(opts.label_col, "selected");
        assert_eq!(opts.title, "people");
        assert_eq!(opts.labels, vec!["false", "true"]);
    }

    #[test]
    fn labels_text_round_trip() {
        let mut opts = LabelOptions::default();
        opts.set_labels_text(" a, b ,, c ");
        assert_eq!(opts.labels, vec!["a", "b", "c"]);
        assert_eq!(opts.labels_text(), "a, b, c");
    }

    #[test]
    fn reads_options_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("opts.json");
        std::fs::write(&path, r#"{ "labels": ["x", "y"], "default_label": "y" }"#).unwrap();
        let opts = LabelOptions::from_json_file(&path).unwrap();
        let set = opts.label_set().unwrap();
        assert_eq!(set.name(set.default_label()), "y");
    }

    #[test]
    fn default_options_form_a_valid_set() {
        let set = LabelOptions::default().label_set().unwrap();
        assert_eq!(set.names(), ["false", "true"]);
    }
}
