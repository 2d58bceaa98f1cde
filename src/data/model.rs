use std::fmt;

use chrono::DateTime;

// ---------------------------------------------------------------------------
// CellValue – a single cell, as shown to the user
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common DataFrame dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    /// Milliseconds since the Unix epoch.
    DateTime(i64),
    Text(String),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::DateTime(ms) => write!(f, "{}", format_datetime(*ms)),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

/// Format epoch milliseconds as an ISO-8601 timestamp (UTC).
pub fn format_datetime(ms: i64) -> String {
    match DateTime::from_timestamp_millis(ms) {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        None => format!("{ms}ms"),
    }
}

// ---------------------------------------------------------------------------
// Categorical – a closed set of names plus one code per row
// ---------------------------------------------------------------------------

/// Column of category codes. Every code indexes `categories`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categorical {
    pub categories: Vec<String>,
    pub codes: Vec<u8>,
}

impl Categorical {
    /// A column of `len` rows all holding `code`.
    pub fn filled(categories: Vec<String>, code: u8, len: usize) -> Self {
        Self {
            categories,
            codes: vec![code; len],
        }
    }

    /// Name behind `code`, or `None` when the code has no category.
    pub fn name_of(&self, code: u8) -> Option<&str> {
        self.categories.get(code as usize).map(String::as_str)
    }

    /// First code that indexes past `categories`, if any.
    pub fn invalid_code(&self) -> Option<u8> {
        self.codes
            .iter()
            .copied()
            .find(|&code| code as usize >= self.categories.len())
    }
}

// ---------------------------------------------------------------------------
// Column data
// ---------------------------------------------------------------------------

/// Column storage, one variant per supported dtype. `None` is a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    /// Milliseconds since the Unix epoch.
    DateTime(Vec<Option<i64>>),
    Text(Vec<Option<String>>),
    Bool(Vec<Option<bool>>),
    Categorical(Categorical),
}

/// Dtype of a column, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    DateTime,
    Text,
    Bool,
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::DateTime => "datetime",
            ColumnKind::Text => "text",
            ColumnKind::Bool => "bool",
            ColumnKind::Categorical => "categorical",
        };
        f.write_str(name)
    }
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::DateTime(v) => v.len(),
            ColumnData::Text(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::Categorical(c) => c.codes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::DateTime(_) => ColumnKind::DateTime,
            ColumnData::Text(_) => ColumnKind::Text,
            ColumnData::Bool(_) => ColumnKind::Bool,
            ColumnData::Categorical(_) => ColumnKind::Categorical,
        }
    }

    /// Value of row `row` as a plot coordinate. Datetimes map to epoch
    /// milliseconds; non-plottable dtypes and missing cells give `None`.
    pub fn coordinate(&self, row: usize) -> Option<f64> {
        match self {
            ColumnData::Numeric(v) => v.get(row).copied().flatten().filter(|x| x.is_finite()),
            ColumnData::DateTime(v) => v.get(row).copied().flatten().map(|ms| ms as f64),
            _ => None,
        }
    }

    /// Value of row `row` for display.
    pub fn cell(&self, row: usize) -> CellValue {
        match self {
            ColumnData::Numeric(v) => v
                .get(row)
                .copied()
                .flatten()
                .map_or(CellValue::Null, CellValue::Number),
            ColumnData::DateTime(v) => v
                .get(row)
                .copied()
                .flatten()
                .map_or(CellValue::Null, CellValue::DateTime),
            ColumnData::Text(v) => v
                .get(row)
                .cloned()
                .flatten()
                .map_or(CellValue::Null, CellValue::Text),
            ColumnData::Bool(v) => v
                .get(row)
                .copied()
                .flatten()
                .map_or(CellValue::Null, CellValue::Bool),
            ColumnData::Categorical(c) => c
                .codes
                .get(row)
                .and_then(|&code| c.name_of(code))
                .map_or(CellValue::Null, |name| CellValue::Text(name.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – named, equal-length columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// The full loaded table. All columns share the same length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table from columns, rejecting ragged or duplicate columns and
    /// categorical codes without a category.
    pub fn from_columns(columns: Vec<Column>) -> anyhow::Result<Self> {
        if let Some(first) = columns.first() {
            let len = first.data.len();
            for col in &columns {
                if col.data.len() != len {
                    anyhow::bail!(
                        "column '{}' has {} rows but '{}' has {len}",
                        col.name,
                        col.data.len(),
                        first.name
                    );
                }
            }
        }
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == col.name) {
                anyhow::bail!("duplicate column name '{}'", col.name);
            }
            if let ColumnData::Categorical(cat) = &col.data {
                if let Some(code) = cat.invalid_code() {
                    anyhow::bail!(
                        "column '{}' has code {code} but only {} categories",
                        col.name,
                        cat.categories.len()
                    );
                }
            }
        }
        Ok(Self { columns })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |c| c.data.len())
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Append a column. The caller guarantees its length matches.
    pub(crate) fn push_column(&mut self, column: Column) {
        debug_assert!(self.columns.is_empty() || column.data.len() == self.len());
        self.columns.push(column);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_ragged_columns() {
        let err = Table::from_columns(vec![
            Column::new("a", ColumnData::Numeric(vec![Some(1.0), Some(2.0)])),
            Column::new("b", ColumnData::Numeric(vec![Some(1.0)])),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("'b' has 1 rows"));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Table::from_columns(vec![
            Column::new("a", ColumnData::Bool(vec![Some(true)])),
            Column::new("a", ColumnData::Bool(vec![Some(false)])),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn coordinates_skip_missing_and_text() {
        let num = ColumnData::Numeric(vec![Some(1.5), None, Some(f64::NAN)]);
        assert_eq!(num.coordinate(0), Some(1.5));
        assert_eq!(num.coordinate(1), None);
        assert_eq!(num.coordinate(2), None);

        let dt = ColumnData::DateTime(vec![Some(86_400_000)]);
        assert_eq!(dt.coordinate(0), Some(86_400_000.0));

        let text = ColumnData::Text(vec![Some("1.0".into())]);
        assert_eq!(text.coordinate(0), None);
    }

    #[test]
    fn categorical_cells_show_names() {
        let cat = ColumnData::Categorical(Categorical {
            categories: vec!["no".into(), "yes".into()],
            codes: vec![1, 0],
        });
        assert_eq!(cat.cell(0), CellValue::Text("yes".into()));
        assert_eq!(cat.kind(), ColumnKind::Categorical);
        assert_eq!(cat.cell(5), CellValue::Null);
    }

    #[test]
    fn rejects_codes_without_category() {
        let bad = Categorical {
            categories: vec!["no".into(), "yes".into()],
            codes: vec![0, 2],
        };
        assert_eq!(bad.invalid_code(), Some(2));
        assert_eq!(ColumnData::Categorical(bad.clone()).cell(1), CellValue::Null);

        let err = Table::from_columns(vec![Column::new("label", ColumnData::Categorical(bad))])
            .unwrap_err();
        assert!(err.to_string().contains("code 2 but only 2 categories"));
    }

    #[test]
    fn datetime_display() {
        assert_eq!(CellValue::DateTime(0).to_string(), "1970-01-01T00:00:00");
    }
}
