use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, StringArray, TimestampMillisecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::{Map, Value as JsonValue};

use super::model::{format_datetime, CellValue, ColumnData, Table};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Save a table to a file.  Dispatch by extension, mirroring
/// [`super::loader::load_file`]. Categorical columns are written as their
/// label names.
pub fn save_file(table: &Table, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => save_parquet(table, path),
        "json" => save_json(table, path),
        "csv" => save_csv(table, path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Cell as CSV text. Missing values are empty cells.
fn csv_field(cell: CellValue) -> String {
    match cell {
        CellValue::Null => String::new(),
        CellValue::DateTime(ms) => format_datetime(ms),
        other => other.to_string(),
    }
}

fn save_csv(table: &Table, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer
        .write_record(table.column_names())
        .context("writing CSV header")?;

    for row in 0..table.len() {
        let record = table.columns().iter().map(|c| csv_field(c.data.cell(row)));
        writer
            .write_record(record)
            .with_context(|| format!("writing CSV row {row}"))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn json_value(cell: CellValue) -> JsonValue {
    match cell {
        CellValue::Number(v) => serde_json::Number::from_f64(v)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        CellValue::DateTime(ms) => JsonValue::String(format_datetime(ms)),
        CellValue::Text(s) => JsonValue::String(s),
        CellValue::Bool(b) => JsonValue::Bool(b),
        CellValue::Null => JsonValue::Null,
    }
}

/// Records orientation, the inverse of the JSON loader.
fn save_json(table: &Table, path: &Path) -> Result<()> {
    let records: Vec<JsonValue> = (0..table.len())
        .map(|row| {
            let obj: Map<String, JsonValue> = table
                .columns()
                .iter()
                .map(|c| (c.name.clone(), json_value(c.data.cell(row))))
                .collect();
            JsonValue::Object(obj)
        })
        .collect();

    let file = std::fs::File::create(path).context("creating JSON file")?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &records)
        .context("writing JSON")?;
    Ok(())
}

fn arrow_array(data: &ColumnData) -> (DataType, ArrayRef) {
    match data {
        ColumnData::Numeric(v) => (DataType::Float64, Arc::new(Float64Array::from(v.clone()))),
        ColumnData::DateTime(v) => (
            DataType::Timestamp(TimeUnit::Millisecond, None),
            Arc::new(TimestampMillisecondArray::from(v.clone())),
        ),
        ColumnData::Text(v) => (
            DataType::Utf8,
            Arc::new(v.iter().map(|s| s.as_deref()).collect::<StringArray>()),
        ),
        ColumnData::Bool(v) => (DataType::Boolean, Arc::new(BooleanArray::from(v.clone()))),
        ColumnData::Categorical(c) => (
            DataType::Utf8,
            Arc::new(
                c.codes
                    .iter()
                    .map(|&code| c.name_of(code))
                    .collect::<StringArray>(),
            ),
        ),
    }
}

fn save_parquet(table: &Table, path: &Path) -> Result<()> {
    let (fields, arrays): (Vec<Field>, Vec<ArrayRef>) = table
        .columns()
        .iter()
        .map(|c| {
            let (dt, array) = arrow_array(&c.data);
            (Field::new(c.name.clone(), dt, true), array)
        })
        .unzip();

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_file;
    use crate::data::model::{Categorical, Column};

    fn table() -> Table {
        Table::from_columns(vec![
            Column::new("x", ColumnData::Numeric(vec![Some(1.5), None, Some(-2.0)])),
            Column::new(
                "when",
                ColumnData::DateTime(vec![Some(0), Some(86_400_000), None]),
            ),
            Column::new(
                "selected",
                ColumnData::Categorical(Categorical {
                    categories: vec!["false".into(), "true".into()],
                    codes: vec![1, 0, 1],
                }),
            ),
        ])
        .unwrap()
    }

    fn labels_of(table: &Table) -> Vec<String> {
        let col = table.column("selected").unwrap();
        (0..table.len()).map(|r| col.data.cell(r).to_string()).collect()
    }

    #[test]
    fn csv_keeps_labels_and_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        save_file(&table(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("x,when,selected\n1.5,1970-01-01T00:00:00,true\n"));

        let back = load_file(&path).unwrap();
        assert_eq!(back.column("x").unwrap().data, table().column("x").unwrap().data);
        assert_eq!(back.column("when").unwrap().data, table().column("when").unwrap().data);
        // "true"/"false" text comes back as a bool column.
        assert_eq!(
            back.column("selected").unwrap().data,
            ColumnData::Bool(vec![Some(true), Some(false), Some(true)])
        );
    }

    #[test]
    fn json_keeps_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        save_file(&table(), &path).unwrap();
        let back = load_file(&path).unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(labels_of(&back), vec!["true", "false", "true"]);
        assert_eq!(back.column("when").unwrap().data, table().column("when").unwrap().data);
    }

    #[test]
    fn parquet_keeps_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.parquet");
        save_file(&table(), &path).unwrap();
        let back = load_file(&path).unwrap();
        assert_eq!(labels_of(&back), vec!["true", "false", "true"]);
        assert_eq!(back.column("x").unwrap().data, table().column("x").unwrap().data);
        assert_eq!(back.column("when").unwrap().data, table().column("when").unwrap().data);
    }

    #[test]
    fn csv_numeric_labels_reopen_for_labelling() {
        use crate::config::LabelOptions;
        use crate::controller::Selection;

        let mut t = Table::from_columns(vec![
            Column::new("x", ColumnData::Numeric(vec![Some(0.0), Some(1.0), Some(2.0)])),
            Column::new("y", ColumnData::Numeric(vec![Some(0.0), Some(1.0), Some(2.0)])),
        ])
        .unwrap();
        let options = LabelOptions {
            label_col: "class".into(),
            labels: vec!["0".into(), "1".into(), "2".into()],
            default_label: "0".into(),
            ..LabelOptions::default()
        };
        let mut view = crate::view::label(&mut t, &options).unwrap();
        let two = view.controller.labels().id_of("2").unwrap();
        view.controller.set_active_label(two);
        view.controller
            .on_brush_end(&mut t, &Selection::from_rows([1]))
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        save_file(&t, &path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "x,y,class\n0,0,0\n1,1,2\n2,2,0\n"
        );

        let mut back = load_file(&path).unwrap();
        let reopened = crate::view::label(&mut back, &options).unwrap();
        assert_eq!(reopened.controller.counts().get("0"), Some(2));
        assert_eq!(reopened.controller.counts().get("2"), Some(1));
        assert_eq!(back.column("class").unwrap().data.cell(1).to_string(), "2");
    }
}
