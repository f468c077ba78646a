use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::array_value_to_string;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;
use serde_json::Value as JsonValue;

use super::model::{Column, Table, Value};

/// Tokens read as missing, the same set Pandas' `read_csv` treats as NA.
const NA_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-nan", "NULL", "null", "None", "<NA>", "#N/A",
];

// ---------------------------------------------------------------------------
// Formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
    Parquet,
}

impl Format {
    /// Pick a format from a file name or URL path. Unknown or missing
    /// extensions fall back to CSV, the usual shape of remote datasets.
    pub fn from_name(name: &str) -> Format {
        Self::from_file_name(name).unwrap_or(Format::Csv)
    }

    /// Strict variant for files on disk and uploads: `None` for an
    /// extension no parser handles.
    pub fn from_file_name(name: &str) -> Option<Format> {
        match extension(name).as_str() {
            "parquet" | "pq" => Some(Format::Parquet),
            "json" => Some(Format::Json),
            "csv" | "txt" | "" => Some(Format::Csv),
            _ => None,
        }
    }
}

fn extension(name: &str) -> String {
    let path = name.split(['?', '#']).next().unwrap_or(name);
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Parse an in-memory payload (file contents, upload or HTTP body).
///
/// Supported formats:
/// * CSV     – header row + data rows
/// * JSON    – records orientation, `[{ "col": value, ... }, ...]`
/// * Parquet – any flat schema written by Pandas or Polars
pub fn parse_bytes(bytes: Bytes, format: Format) -> Result<Table> {
    match format {
        Format::Csv => load_csv(bytes.as_ref()),
        Format::Json => load_json(&bytes),
        Format::Parquet => load_parquet(bytes),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row with column names, one record per line. Cell types are
/// guessed per cell and then unified per column by [`Column::infer`].
fn load_csv<R: Read>(input: R) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(String::is_empty) {
        bail!("CSV has no header row");
    }

    let mut cells: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col_idx, slot) in cells.iter_mut().enumerate() {
            slot.push(guess_value(record.get(col_idx).unwrap_or("")));
        }
    }

    build_table(headers.into_iter().zip(cells))
}

fn guess_value(s: &str) -> Value {
    if NA_TOKENS.contains(&s) {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    match s {
        "True" | "true" | "TRUE" => Value::Bool(true),
        "False" | "false" | "FALSE" => Value::Bool(false),
        _ => Value::String(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "species": "Amur Leopard", "population": 100, "continent": "Asia" },
///   ...
/// ]
/// ```
///
/// Columns appear in first-seen order; absent keys become nulls.
fn load_json(raw: &[u8]) -> Result<Table> {
    let root: JsonValue = serde_json::from_slice(raw).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut names: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let cells: Vec<Vec<Value>> = names
        .iter()
        .map(|name| {
            records
                .iter()
                .map(|rec| rec.get(name).map(json_to_value).unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    build_table(names.into_iter().zip(cells))
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file; each Arrow field becomes one column.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet<T: ChunkReader + 'static>(input: T) -> Result<Table> {
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(input).context("reading parquet metadata")?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut cells: Vec<Vec<Value>> = vec![Vec::new(); names.len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, slot) in cells.iter_mut().enumerate() {
            let array = batch.column(col_idx);
            for row in 0..batch.num_rows() {
                slot.push(
                    extract_value(array, row)
                        .with_context(|| format!("column '{}', row {row}", names[col_idx]))?,
                );
            }
        }
    }

    build_table(names.into_iter().zip(cells))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> Result<Value> {
    if col.is_null(row) {
        return Ok(Value::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => Value::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Value::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => Value::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => Value::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => Value::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Value::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => Value::Integer(col.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => Value::Integer(col.as_primitive::<UInt16Type>().value(row) as i64),
        DataType::UInt32 => Value::Integer(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v)
                .map(Value::Integer)
                .unwrap_or(Value::Float(v as f64))
        }
        DataType::Float32 => Value::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Value::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Value::Bool(col.as_boolean().value(row)),
        _ => Value::String(
            array_value_to_string(col.as_ref(), row).context("formatting arrow value")?,
        ),
    };
    Ok(value)
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

fn build_table(named_cells: impl IntoIterator<Item = (String, Vec<Value>)>) -> Result<Table> {
    let columns: Vec<Column> = named_cells
        .into_iter()
        .map(|(name, cells)| Column::infer(name, cells))
        .collect();
    if columns.is_empty() {
        bail!("dataset has no columns");
    }
    Table::new(columns).context("assembling table")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::DType;

    const CSV: &str = "species,population,weight_kg,conservation_status\n\
                       Amur Leopard,100,45.5,CR\n\
                       Sumatran Tiger,400,,CR\n\
                       Giant Panda,1864,100.0,VU\n";

    #[test]
    fn csv_types_are_inferred_per_column() {
        let table = parse_bytes(Bytes::from_static(CSV.as_bytes()), Format::Csv).unwrap();
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.n_cols(), 4);
        assert_eq!(table.column("species").unwrap().dtype, DType::Object);
        assert_eq!(table.column("population").unwrap().dtype, DType::Int64);
        assert_eq!(table.column("weight_kg").unwrap().dtype, DType::Float64);
        assert_eq!(table.column("weight_kg").unwrap().null_count(), 1);
    }

    #[test]
    fn csv_na_tokens_are_missing() {
        let raw = "a,b\n1,NA\n2,x\nN/A,y\n";
        let table = parse_bytes(Bytes::from(raw), Format::Csv).unwrap();
        assert_eq!(table.column("a").unwrap().null_count(), 1);
        assert_eq!(table.column("a").unwrap().dtype, DType::Float64);
        assert_eq!(table.column("b").unwrap().null_count(), 1);
    }

    #[test]
    fn ragged_csv_is_a_parse_error() {
        let raw = "a,b\n1,2\n3\n";
        assert!(parse_bytes(Bytes::from(raw), Format::Csv).is_err());
    }

    #[test]
    fn json_records_fill_absent_keys_with_null() {
        let raw = r#"[{"species": "Kakapo", "population": 252},
                      {"species": "Vaquita", "diet_type": "Carnivore"}]"#;
        let table = parse_bytes(Bytes::from(raw), Format::Json).unwrap();
        assert_eq!(
            table.column_names(),
            vec!["species", "population", "diet_type"]
        );
        assert_eq!(table.column("population").unwrap().null_count(), 1);
        assert_eq!(table.column("diet_type").unwrap().null_count(), 1);
    }

    #[test]
    fn json_must_be_an_array() {
        assert!(parse_bytes(Bytes::from(r#"{"a": 1}"#), Format::Json).is_err());
    }

    #[test]
    fn format_from_url_ignores_query() {
        assert_eq!(Format::from_name("https://x/data.json?raw=1"), Format::Json);
        assert_eq!(Format::from_name("https://x/data.parquet"), Format::Parquet);
        assert_eq!(Format::from_name("https://x/download"), Format::Csv);
        assert_eq!(Format::from_name("https://x/export.xlsx"), Format::Csv);
    }

    #[test]
    fn strict_format_rejects_unknown_extensions() {
        assert_eq!(Format::from_file_name("animals.CSV"), Some(Format::Csv));
        assert_eq!(Format::from_file_name("animals.pq"), Some(Format::Parquet));
        assert_eq!(Format::from_file_name("animals.xlsx"), None);
    }
}
