use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::DataError;
use super::model::RawTable;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a raw delivery table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row followed by one delivery per line (recommended)
/// * `.json`    – `[{ "Weather": "Sunny", "Delivery_Time": 120, ... }, ...]`
/// * `.parquet` – flat columns of strings / integers / floats / booleans
pub fn load_file(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        _ => Err(DataError::UnsupportedExtension {
            path: path.to_path_buf(),
            extension: ext,
        }
        .into()),
    }?;

    log::info!(
        "Read {} rows x {} columns from {}",
        table.rows().len(),
        table.headers().len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Missing-value convention
// ---------------------------------------------------------------------------

/// Cell texts read as missing, matching the default NA set of common dataframe readers.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn text_cell(s: &str) -> Option<String> {
    if NA_TOKENS.contains(&s) {
        None
    } else {
        Some(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, then one record per line.
/// Short rows are padded with missing cells.
fn load_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table = RawTable::new(headers);

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        table.push_row(record.iter().map(text_cell).collect());
    }

    Ok(table)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Agent_Age": 37, "Agent_Rating": 4.9, "Weather": "Sunny", "Delivery_Time": 120 },
///   ...
/// ]
/// ```
///
/// Columns are the union of all object keys in order of first appearance; a key
/// absent from an object is a missing cell.
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .ok_or_else(|| DataError::Malformed("expected top-level JSON array".into()))?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| DataError::Malformed(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let mut table = RawTable::new(headers);
    for rec in records {
        // Shape already checked above.
        let Some(obj) = rec.as_object() else {
            continue;
        };
        let cells = table
            .headers()
            .iter()
            .map(|h| obj.get(h).and_then(json_cell))
            .collect();
        table.push_row(cells);
    }

    Ok(table)
}

fn json_cell(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => text_cell(s),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut table = RawTable::new(headers);

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let columns = batch.columns();

        for row in 0..batch.num_rows() {
            let cells = columns
                .iter()
                .map(|col| extract_cell(col, row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("parquet row {row}"))?;
            table.push_row(cells);
        }
    }

    Ok(table)
}

/// Extract a single cell from an Arrow column at a given row as text.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let any = col.as_any();
    let text = match col.data_type() {
        DataType::Utf8 => match any.downcast_ref::<StringArray>() {
            Some(s) => return Ok(text_cell(s.value(row))),
            None => array_value_to_string(col.as_ref(), row)?,
        },
        DataType::LargeUtf8 => return Ok(text_cell(col.as_string::<i64>().value(row))),
        DataType::Int32 => match any.downcast_ref::<Int32Array>() {
            Some(arr) => arr.value(row).to_string(),
            None => array_value_to_string(col.as_ref(), row)?,
        },
        DataType::Int64 => match any.downcast_ref::<Int64Array>() {
            Some(arr) => arr.value(row).to_string(),
            None => array_value_to_string(col.as_ref(), row)?,
        },
        DataType::Float32 => match any.downcast_ref::<Float32Array>() {
            Some(arr) if arr.value(row).is_nan() => return Ok(None),
            Some(arr) => arr.value(row).to_string(),
            None => array_value_to_string(col.as_ref(), row)?,
        },
        DataType::Float64 => match any.downcast_ref::<Float64Array>() {
            Some(arr) if arr.value(row).is_nan() => return Ok(None),
            Some(arr) => arr.value(row).to_string(),
            None => array_value_to_string(col.as_ref(), row)?,
        },
        DataType::Boolean => match any.downcast_ref::<BooleanArray>() {
            Some(arr) => arr.value(row).to_string(),
            None => array_value_to_string(col.as_ref(), row)?,
        },
        _ => array_value_to_string(col.as_ref(), row)?,
    };
    Ok(Some(text))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::NamedTempFile;

    use super::*;

    fn temp_with(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file.flush().expect("flush");
        file
    }

    #[test]
    fn csv_reads_headers_and_marks_na_tokens_missing() {
        let file = temp_with(
            ".csv",
            "Order_ID,Weather,Delivery_Time\nA1,Sunny,120\nA2,NaN,95\nA3,Fog,\nA4,Stormy\n",
        );
        let table = load_file(file.path()).expect("load csv");

        assert_eq!(table.headers(), vec!["Order_ID", "Weather", "Delivery_Time"]);
        assert_eq!(table.rows().len(), 4);
        assert_eq!(
            table.rows()[0],
            vec![Some("A1".into()), Some("Sunny".into()), Some("120".into())]
        );
        assert_eq!(table.rows()[1][1], None);
        assert_eq!(table.rows()[2][2], None);
        // short row padded
        assert_eq!(table.rows()[3].len(), 3);
        assert_eq!(table.rows()[3][2], None);
    }

    #[test]
    fn json_records_union_keys_and_nulls() {
        let file = temp_with(
            ".json",
            r#"[
                {"Weather": "Sunny", "Delivery_Time": 120},
                {"Weather": null, "Delivery_Time": 95.5, "Area": "Urban"}
            ]"#,
        );
        let table = load_file(file.path()).expect("load json");

        assert_eq!(table.headers(), vec!["Weather", "Delivery_Time", "Area"]);
        assert_eq!(
            table.rows()[0],
            vec![Some("Sunny".into()), Some("120".into()), None]
        );
        assert_eq!(
            table.rows()[1],
            vec![None, Some("95.5".into()), Some("Urban".into())]
        );
    }

    #[test]
    fn json_headers_keep_key_order_of_the_document() {
        let file = temp_with(
            ".json",
            r#"[{"Weather": "Sunny", "Delivery_Time": 1, "Agent_Age": 3}]"#,
        );
        let table = load_file(file.path()).expect("load json");
        assert_eq!(table.headers(), vec!["Weather", "Delivery_Time", "Agent_Age"]);
    }

    #[test]
    fn json_rejects_non_array_root() {
        let file = temp_with(".json", r#"{"Weather": "Sunny"}"#);
        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("top-level JSON array"));
    }

    #[test]
    fn parquet_flat_columns_become_text_cells() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Weather", DataType::Utf8, true),
            Field::new("Delivery_Time", DataType::Float64, true),
            Field::new("Agent_Age", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("Sunny"), None])),
                Arc::new(Float64Array::from(vec![Some(120.5), Some(f64::NAN)])),
                Arc::new(Int64Array::from(vec![Some(31), Some(24)])),
            ],
        )
        .expect("batch");

        let file = tempfile::Builder::new()
            .suffix(".parquet")
            .tempfile()
            .expect("temp file");
        let mut writer =
            ArrowWriter::try_new(file.as_file().try_clone().expect("clone"), schema, None).expect("writer");
        writer.write(&batch).expect("write");
        writer.close().expect("close");

        let table = load_file(file.path()).expect("load parquet");
        assert_eq!(table.headers(), vec!["Weather", "Delivery_Time", "Agent_Age"]);
        assert_eq!(
            table.rows()[0],
            vec![Some("Sunny".into()), Some("120.5".into()), Some("31".into())]
        );
        assert_eq!(table.rows()[1], vec![None, None, Some("24".into())]);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = temp_with(".xlsx", "");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::UnsupportedExtension { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_file(Path::new("/definitely/not/here.csv")).is_err());
    }
}
