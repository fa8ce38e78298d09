use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::MeasurementSeries;
use crate::config::ColumnConfig;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a measurement sweep from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one sample per row (recommended)
/// * `.json`    – `[{ "Frequency": 1.0, "Gain": 15.1 }, ...]`
/// * `.parquet` – scalar numeric columns
///
/// Only the two configured columns are read; everything else is ignored.
pub fn load_series(path: &Path, columns: &ColumnConfig) -> Result<MeasurementSeries> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let (x, y) = match ext.as_str() {
        "csv" => load_csv(path, columns)?,
        "json" => load_json(path, columns)?,
        "parquet" | "pq" => load_parquet(path, columns)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    let mut series = MeasurementSeries::new(x, y);
    series.x_column = columns.x.clone();
    series.y_column = columns.y.clone();
    series.source = Some(path.to_path_buf());
    Ok(series)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one sample per row.
/// ```text
/// Frequency,Gain
/// 2.40,15.1
/// 2.41,15.0
/// ```
fn load_csv(path: &Path, columns: &ColumnConfig) -> Result<(Vec<f64>, Vec<f64>)> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;
    read_csv(reader, columns)
}

fn read_csv<R: std::io::Read>(
    mut reader: csv::Reader<R>,
    columns: &ColumnConfig,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let x_idx = headers
        .iter()
        .position(|h| h == columns.x)
        .with_context(|| format!("CSV missing '{}' column", columns.x))?;
    let y_idx = headers
        .iter()
        .position(|h| h == columns.y)
        .with_context(|| format!("CSV missing '{}' column", columns.y))?;

    let mut x = Vec::new();
    let mut y = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        x.push(parse_cell(record.get(x_idx), row_no, &columns.x)?);
        y.push(parse_cell(record.get(y_idx), row_no, &columns.y)?);
    }

    Ok((x, y))
}

fn parse_cell(cell: Option<&str>, row: usize, col: &str) -> Result<f64> {
    let s = cell.with_context(|| format!("Row {row}: missing '{col}' value"))?;
    s.parse::<f64>()
        .with_context(|| format!("Row {row}, {col}: '{s}' is not a number"))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "Frequency": 2.40, "Gain": 15.1 },
///   { "Frequency": 2.41, "Gain": 15.0 }
/// ]
/// ```
fn load_json(path: &Path, columns: &ColumnConfig) -> Result<(Vec<f64>, Vec<f64>)> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    read_json(&root, columns)
}

fn read_json(root: &JsonValue, columns: &ColumnConfig) -> Result<(Vec<f64>, Vec<f64>)> {
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut x = Vec::with_capacity(records.len());
    let mut y = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for (col, out) in [(&columns.x, &mut x), (&columns.y, &mut y)] {
            let value = obj
                .get(col.as_str())
                .with_context(|| format!("Row {i}: missing '{col}'"))?
                .as_f64()
                .with_context(|| format!("Row {i}, {col}: not a number"))?;
            out.push(value);
        }
    }

    Ok((x, y))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one row per sample.
///
/// The configured columns may be Float64, Float32, Int64 or Int32. Works with
/// files written by both **Pandas** (`df.to_parquet()`) and **Polars**.
fn load_parquet(path: &Path, columns: &ColumnConfig) -> Result<(Vec<f64>, Vec<f64>)> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    // Resolve columns from the file schema so an empty file still reports them.
    let schema = builder.schema().clone();
    let x_idx = schema
        .index_of(&columns.x)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{}' column", columns.x))?;
    let y_idx = schema
        .index_of(&columns.y)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{}' column", columns.y))?;

    let reader = builder.build().context("building parquet reader")?;

    let mut x = Vec::new();
    let mut y = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        x.extend(extract_f64_column(batch.column(x_idx)).with_context(|| format!("reading '{}'", columns.x))?);
        y.extend(extract_f64_column(batch.column(y_idx)).with_context(|| format!("reading '{}'", columns.y))?);
    }

    Ok((x, y))
}

/// Read a numeric Arrow column as `f64`. Nulls are rejected.
fn extract_f64_column(col: &Arc<dyn Array>) -> Result<Vec<f64>> {
    if col.null_count() > 0 {
        bail!("{} null value(s) in numeric column", col.null_count());
    }

    let values = match col.data_type() {
        DataType::Float64 => downcast::<Float64Array>(col)?.values().to_vec(),
        DataType::Float32 => downcast::<Float32Array>(col)?
            .values()
            .iter()
            .map(|&v| v as f64)
            .collect(),
        DataType::Int64 => downcast::<Int64Array>(col)?
            .values()
            .iter()
            .map(|&v| v as f64)
            .collect(),
        DataType::Int32 => downcast::<Int32Array>(col)?
            .values()
            .iter()
            .map(|&v| v as f64)
            .collect(),
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    Ok(values)
}

fn downcast<T: 'static>(col: &Arc<dyn Array>) -> Result<&T> {
    col.as_any()
        .downcast_ref::<T>()
        .with_context(|| format!("unexpected array type {:?}", col.data_type()))
}
