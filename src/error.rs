use thiserror::Error;

use crate::labels::MAX_LABELS;

// ---------------------------------------------------------------------------
// Errors raised while building or driving a labelling session
// ---------------------------------------------------------------------------

/// Every way constructing a [`crate::controller::LabelController`] (or
/// applying a selection to a table) can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("column '{column}' not in table")]
    UnknownColumn { column: String },

    #[error("column '{column}' is {kind} and cannot be plotted; pick a numeric or datetime column")]
    NotPlottable { column: String, kind: String },

    #[error(
        "column '{column}' is {kind}, but a label column must be categorical. \
         Use another label column name instead"
    )]
    NotCategorical { column: String, kind: String },

    #[error("label column '{column}' holds '{value}', which is not in the label set")]
    LabelOutsideSet { column: String, value: String },

    #[error("label '{0}' appears more than once")]
    DuplicateLabel(String),

    #[error("{count} labels given, at most {max} are supported", max = MAX_LABELS)]
    TooManyLabels { count: usize },

    #[error("label set is empty")]
    EmptyLabelSet,

    #[error("default label '{0}' is not in the label set")]
    UnknownDefaultLabel(String),

    #[error("row {row} out of range for a table of {len} rows")]
    RowOutOfRange { row: usize, len: usize },
}
