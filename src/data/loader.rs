use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::{cast, concat_batches};
use arrow::datatypes::{DataType, Float64Type, TimeUnit, TimestampMillisecondType};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Categorical, Column, ColumnData, Table};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – any flat schema of numeric, temporal, string or bool columns
/// * `.json`    – `[{ "x": 1.0, "y": 2.0, ...other columns }, ...]`
/// * `.csv`     – header row, one value per cell, dtypes inferred per column
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Type inference shared by the text formats
// ---------------------------------------------------------------------------

/// Parse the datetime spellings pandas commonly writes, as epoch milliseconds.
pub fn parse_datetime(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Pick the narrowest dtype every non-missing cell fits:
/// numeric, then datetime, then bool, falling back to text.
fn infer_column(cells: Vec<Option<String>>) -> ColumnData {
    let present = || cells.iter().flatten();

    // An all-missing column carries no type information; keep it as text.
    if present().next().is_none() {
        return ColumnData::Text(cells);
    }

    if present().all(|s| s.trim().parse::<f64>().is_ok()) {
        return ColumnData::Numeric(
            cells
                .iter()
                .map(|c| c.as_ref().and_then(|s| s.trim().parse().ok()))
                .collect(),
        );
    }
    if present().all(|s| parse_datetime(s).is_some()) {
        return ColumnData::DateTime(
            cells
                .iter()
                .map(|c| c.as_deref().and_then(parse_datetime))
                .collect(),
        );
    }
    // pandas writes `True`/`False`.
    if present().all(|s| s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false")) {
        return ColumnData::Bool(
            cells
                .iter()
                .map(|c| c.as_deref().map(|s| s.eq_ignore_ascii_case("true")))
                .collect(),
        );
    }
    ColumnData::Text(cells)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one value per cell.
/// Empty cells are missing values.
fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col_idx, column) in cells.iter_mut().enumerate() {
            let value = record.get(col_idx).unwrap_or("");
            column.push((!value.is_empty()).then(|| value.to_string()));
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, cells)| Column::new(name, infer_column(cells)))
        .collect();

    Table::from_columns(columns)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "x": 1.2, "y": 3.4, "group": "A" },
///   ...
/// ]
/// ```
///
/// A key missing from a record is a missing value for that row.
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut names: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut cells: Vec<Vec<Option<&JsonValue>>> = Vec::new();

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        for (key, val) in obj {
            let col = *index.entry(key.clone()).or_insert_with(|| {
                names.push(key.clone());
                cells.push(vec![None; i]);
                names.len() - 1
            });
            cells[col].push((!val.is_null()).then_some(val));
        }
        // Pad columns this record did not mention.
        for column in &mut cells {
            if column.len() == i {
                column.push(None);
            }
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::new(name, json_column(&values)))
        .collect();

    Table::from_columns(columns)
}

fn json_column(values: &[Option<&JsonValue>]) -> ColumnData {
    let present = || values.iter().flatten();

    if present().next().is_some() && present().all(|v| v.is_number()) {
        return ColumnData::Numeric(values.iter().map(|v| v.and_then(JsonValue::as_f64)).collect());
    }
    if present().next().is_some() && present().all(|v| v.is_boolean()) {
        return ColumnData::Bool(values.iter().map(|v| v.and_then(JsonValue::as_bool)).collect());
    }

    let text: Vec<Option<String>> = values
        .iter()
        .map(|v| {
            v.map(|v| match v {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            })
        })
        .collect();

    // Only datetimes are recovered from strings; "1.5" or "true" stay text.
    match infer_column(text.clone()) {
        ColumnData::DateTime(millis) => ColumnData::DateTime(millis),
        _ => ColumnData::Text(text),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file.
///
/// Column mapping:
/// - integer / float            → numeric
/// - Timestamp / Date32 / Date64 → datetime (epoch ms)
/// - Utf8 / LargeUtf8            → text
/// - Boolean                     → bool
/// - Dictionary(_, Utf8)         → categorical (pandas `category` dtype)
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("building parquet reader")?;

    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .context("reading parquet record batch")?;
    let batch = concat_batches(&schema, &batches).context("joining parquet record batches")?;

    let mut columns = Vec::with_capacity(schema.fields().len());
    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        let data = arrow_column(array)
            .with_context(|| format!("reading parquet column '{}'", field.name()))?;
        columns.push(Column::new(field.name().clone(), data));
    }

    Table::from_columns(columns)
}

// -- Parquet / Arrow helpers --

/// Convert a whole Arrow array into column storage.
fn arrow_column(array: &ArrayRef) -> Result<ColumnData> {
    let data = match array.data_type() {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float16
        | DataType::Float32
        | DataType::Float64 => {
            let floats = cast(array, &DataType::Float64)?;
            ColumnData::Numeric(floats.as_primitive::<Float64Type>().iter().collect())
        }
        DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64 => {
            let millis = cast(array, &DataType::Timestamp(TimeUnit::Millisecond, None))?;
            ColumnData::DateTime(
                millis
                    .as_primitive::<TimestampMillisecondType>()
                    .iter()
                    .collect(),
            )
        }
        DataType::Utf8 | DataType::LargeUtf8 => ColumnData::Text(utf8_values(array)?),
        DataType::Boolean => ColumnData::Bool(array.as_boolean().iter().collect()),
        DataType::Dictionary(_, value) if is_utf8(value) => {
            let values = utf8_values(array)?;
            match categorical_from_strings(&values) {
                Some(cat) => ColumnData::Categorical(cat),
                None => ColumnData::Text(values),
            }
        }
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(data)
}

fn is_utf8(dt: &DataType) -> bool {
    matches!(dt, DataType::Utf8 | DataType::LargeUtf8)
}

fn utf8_values(array: &ArrayRef) -> Result<Vec<Option<String>>> {
    let strings = cast(array, &DataType::Utf8)?;
    Ok(strings
        .as_string::<i32>()
        .iter()
        .map(|s| s.map(str::to_string))
        .collect())
}

/// Categories in order of first appearance. `None` if a value is missing or
/// there are more categories than a code can address.
fn categorical_from_strings(values: &[Option<String>]) -> Option<Categorical> {
    let mut categories: Vec<String> = Vec::new();
    let mut codes = Vec::with_capacity(values.len());
    for value in values {
        let value = value.as_ref()?;
        let code = match categories.iter().position(|c| c == value) {
            Some(code) => code,
            None => {
                categories.push(value.clone());
                categories.len() - 1
            }
        };
        codes.push(u8::try_from(code).ok()?);
    }
    Some(Categorical { categories, codes })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{DictionaryArray, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Int8Type, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::model::ColumnKind;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn csv_infers_dtypes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "t.csv",
            "x,when,flag,name\n1,2024-01-02,true,a\n2.5,2024-01-03 10:00:00,false,\n,,true,c\n",
        );
        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 3);

        let kinds: Vec<_> = table.columns().iter().map(|c| c.data.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ColumnKind::Numeric,
                ColumnKind::DateTime,
                ColumnKind::Bool,
                ColumnKind::Text
            ]
        );
        assert_eq!(
            table.column("x").unwrap().data,
            ColumnData::Numeric(vec![Some(1.0), Some(2.5), None])
        );
        assert_eq!(
            table.column("name").unwrap().data,
            ColumnData::Text(vec![Some("a".into()), None, Some("c".into())])
        );
    }

    #[test]
    fn csv_bools_ignore_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "t.csv", "x,selected\n0,False\n1,True\n2,\n");
        let table = load_file(&path).unwrap();
        assert_eq!(
            table.column("selected").unwrap().data,
            ColumnData::Bool(vec![Some(false), Some(true), None])
        );
    }

    #[test]
    fn json_records_with_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "t.json",
            r#"[{"x": 1, "y": 2.0, "tag": "a"}, {"x": 3, "y": null}, {"y": 4, "tag": "2024-01-01"}]"#,
        );
        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.column("x").unwrap().data,
            ColumnData::Numeric(vec![Some(1.0), Some(3.0), None])
        );
        assert_eq!(
            table.column("y").unwrap().data,
            ColumnData::Numeric(vec![Some(2.0), None, Some(4.0)])
        );
        // Mixed plain text and dates stays text.
        assert_eq!(table.column("tag").unwrap().data.kind(), ColumnKind::Text);
    }

    #[test]
    fn json_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "t.json", r#"{"x": [1, 2]}"#);
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn unknown_extension_fails() {
        let err = load_file(Path::new("table.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }

    #[test]
    fn parquet_maps_arrow_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.parquet");

        let keys = arrow::array::Int8Array::from(vec![0, 1, 0]);
        let dict_values = Arc::new(StringArray::from(vec!["no", "yes"]));
        let dict = DictionaryArray::<Int8Type>::try_new(keys, dict_values).unwrap();

        let schema = Arc::new(Schema::new(vec![
            Field::new("x", DataType::Float64, true),
            Field::new("n", DataType::Int64, false),
            Field::new(
                "cat",
                DataType::Dictionary(Box::new(DataType::Int8), Box::new(DataType::Utf8)),
                false,
            ),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![Some(1.0), None, Some(3.0)])),
                Arc::new(Int64Array::from(vec![7, 8, 9])),
                Arc::new(dict),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(
            table.column("x").unwrap().data,
            ColumnData::Numeric(vec![Some(1.0), None, Some(3.0)])
        );
        assert_eq!(
            table.column("n").unwrap().data,
            ColumnData::Numeric(vec![Some(7.0), Some(8.0), Some(9.0)])
        );
        assert_eq!(
            table.column("cat").unwrap().data,
            ColumnData::Categorical(Categorical {
                categories: vec!["no".into(), "yes".into()],
                codes: vec![0, 1, 0],
            })
        );
    }

    #[test]
    fn datetime_spellings() {
        assert_eq!(parse_datetime("1970-01-02"), Some(86_400_000));
        assert_eq!(parse_datetime("1970-01-01T00:00:01"), Some(1_000));
        assert_eq!(parse_datetime("1970-01-01 00:00:01.5"), Some(1_500));
        assert_eq!(parse_datetime("1970-01-01T00:00:00Z"), Some(0));
        assert_eq!(parse_datetime("tomorrow"), None);
    }
}
