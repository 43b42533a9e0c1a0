use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{FeaturePoint, FeatureTable, RawRecord, RawTable};
use crate::error::CcsError;

/// Column names of the instrument export.
pub const COL_MZ: &str = "m_z";
pub const COL_RT: &str = "rt";
pub const COL_INTEN: &str = "inten";

/// Extra columns written by [`save_table`].
pub const COL_INDEX: &str = "index";
pub const COL_Z: &str = "z";
pub const COL_CCS: &str = "CCS";
pub const COL_LOG_INTENSITY: &str = "Log_Intensity";
pub const COL_SELECTED: &str = "Selected";
pub const COL_SERIES: &str = "Series";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a raw export.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`         – comma-delimited with a header row
/// * `.tsv`, `.txt` – tab-delimited with a header row
/// * `.parquet`     – numeric `m_z`, `rt`, `inten` columns
/// * `.json`        – `[{ "m_z": ..., "rt": ..., "inten": ... }, ...]`
///
/// Only `m_z`, `rt` and `inten` are read; other columns are ignored.
pub fn load_file(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_delimited(path, b','),
        "tsv" | "txt" => load_delimited(path, b'\t'),
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!("Read {} raw rows from {}", table.len(), path.display());
    Ok(table)
}

/// Write the feature table tab-delimited with decimal commas.
pub fn save_table(table: &FeatureTable, path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    writer.write_record([
        COL_INDEX,
        COL_MZ,
        COL_RT,
        COL_INTEN,
        COL_Z,
        COL_CCS,
        COL_LOG_INTENSITY,
        COL_SELECTED,
        COL_SERIES,
    ])?;
    for p in &table.points {
        writer.write_record([
            p.source_row.to_string(),
            decimal_comma(p.mz),
            decimal_comma(p.rt),
            decimal_comma(p.inten),
            p.z.to_string(),
            decimal_comma(p.ccs),
            decimal_comma(p.log_intensity),
            if p.selected { "True" } else { "False" }.to_string(),
            p.series.to_string(),
        ])?;
    }
    writer
        .flush()
        .with_context(|| format!("writing {}", path.display()))?;

    log::info!("Saved {} points to {}", table.len(), path.display());
    Ok(())
}

/// Read back a table written by [`save_table`].
pub fn load_processed(path: &Path) -> Result<FeatureTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers = header_names(&mut reader)?;

    let find = |name: &str| column_index(&headers, name);
    let idx = [
        find(COL_INDEX)?,
        find(COL_MZ)?,
        find(COL_RT)?,
        find(COL_INTEN)?,
        find(COL_Z)?,
        find(COL_CCS)?,
        find(COL_LOG_INTENSITY)?,
        find(COL_SELECTED)?,
        find(COL_SERIES)?,
    ];

    let mut points = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("row {row_no}"))?;
        let cell = |i: usize| record.get(idx[i]).unwrap_or("").trim();

        points.push(FeaturePoint {
            source_row: parse_int(cell(0), row_no, COL_INDEX)?,
            mz: parse_comma_float(cell(1), row_no, COL_MZ)?,
            rt: parse_comma_float(cell(2), row_no, COL_RT)?,
            inten: parse_comma_float(cell(3), row_no, COL_INTEN)?,
            z: parse_int(cell(4), row_no, COL_Z)?,
            ccs: parse_comma_float(cell(5), row_no, COL_CCS)?,
            log_intensity: parse_comma_float(cell(6), row_no, COL_LOG_INTENSITY)?,
            selected: parse_bool(cell(7), row_no)?,
            series: parse_int(cell(8), row_no, COL_SERIES)?,
        });
    }

    log::info!("Reloaded {} processed points from {}", points.len(), path.display());
    Ok(FeatureTable::new(points))
}

// ---------------------------------------------------------------------------
// Delimited loader
// ---------------------------------------------------------------------------

fn load_delimited(path: &Path, delimiter: u8) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .context("opening delimited file")?;
    let headers = header_names(&mut reader)?;

    let mz_idx = column_index(&headers, COL_MZ)?;
    let rt_idx = column_index(&headers, COL_RT)?;
    let inten_idx = column_index(&headers, COL_INTEN)?;

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("row {row_no}"))?;
        let cell = |i: usize| record.get(i).unwrap_or("").trim();

        records.push(RawRecord {
            mz: parse_float(cell(mz_idx), row_no, COL_MZ)?,
            rt: parse_float(cell(rt_idx), row_no, COL_RT)?,
            inten: parse_float(cell(inten_idx), row_no, COL_INTEN)?,
        });
    }

    Ok(RawTable::new(records))
}

fn header_names<R: std::io::Read>(reader: &mut csv::Reader<R>) -> Result<Vec<String>> {
    Ok(reader
        .headers()
        .context("reading header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect())
}

fn column_index(headers: &[String], name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| CcsError::FileFormat(format!("missing '{name}' column")).into())
}

/// Finite numbers only; `NaN` and `inf` are rejected like any other bad cell.
fn parse_float(s: &str, row: usize, col: &str) -> Result<f64> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(CcsError::FileFormat(format!("row {row}, {col}: '{s}' is not a number")).into()),
    }
}

/// Parse a float written with a decimal comma.
fn parse_comma_float(s: &str, row: usize, col: &str) -> Result<f64> {
    parse_float(&s.replace(',', "."), row, col)
}

fn parse_int<T: std::str::FromStr>(s: &str, row: usize, col: &str) -> Result<T> {
    s.parse::<T>()
        .map_err(|_| CcsError::FileFormat(format!("row {row}, {col}: '{s}' is not an integer")).into())
}

fn parse_bool(s: &str, row: usize) -> Result<bool> {
    match s {
        "True" | "true" | "1" => Ok(true),
        "False" | "false" | "0" => Ok(false),
        other => Err(CcsError::FileFormat(format!(
            "row {row}, {}: '{other}' is not a boolean",
            COL_SELECTED
        ))
        .into()),
    }
}

/// Format a float with `,` as decimal separator.
pub fn decimal_comma(v: f64) -> String {
    v.to_string().replace('.', ",")
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, as written by `df.to_json(orient='records')`.
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let records = rows
        .iter()
        .enumerate()
        .map(|(i, row)| -> Result<RawRecord> {
            let obj = row
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;
            let field = |name: &str| -> Result<f64> {
                obj.get(name)
                    .and_then(JsonValue::as_f64)
                    .ok_or_else(|| {
                        CcsError::FileFormat(format!("row {i}: missing or non-numeric '{name}'")).into()
                    })
            };
            Ok(RawRecord {
                mz: field(COL_MZ)?,
                rt: field(COL_RT)?,
                inten: field(COL_INTEN)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RawTable::new(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet export with numeric `m_z`, `rt` and `inten` columns
/// (Float64, Float32, Int64 or Int32).
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let column = |name: &str| -> Result<Vec<f64>> {
            let idx = schema
                .index_of(name)
                .map_err(|_| CcsError::FileFormat(format!("missing '{name}' column")))?;
            extract_f64_column(batch.column(idx), name)
        };
        let mz = column(COL_MZ)?;
        let rt = column(COL_RT)?;
        let inten = column(COL_INTEN)?;

        records.extend(
            mz.into_iter()
                .zip(rt)
                .zip(inten)
                .map(|((mz, rt), inten)| RawRecord { mz, rt, inten }),
        );
    }

    Ok(RawTable::new(records))
}

/// Widen a numeric Arrow column to `Vec<f64>`. Nulls are rejected.
fn extract_f64_column(col: &Arc<dyn Array>, name: &str) -> Result<Vec<f64>> {
    if col.null_count() > 0 {
        return Err(CcsError::FileFormat(format!("null values in '{name}' column")).into());
    }

    macro_rules! widen {
        ($ty:ty) => {
            col.as_any()
                .downcast_ref::<$ty>()
                .with_context(|| format!("'{name}': unexpected array type"))?
                .values()
                .iter()
                .map(|&v| v as f64)
                .collect()
        };
    }

    let values: Vec<f64> = match col.data_type() {
        DataType::Float64 => widen!(Float64Array),
        DataType::Float32 => widen!(Float32Array),
        DataType::Int64 => widen!(Int64Array),
        DataType::Int32 => widen!(Int32Array),
        other => {
            return Err(
                CcsError::FileFormat(format!("'{name}' has type {other:?}, expected a number")).into(),
            )
        }
    };
    if let Some(row) = values.iter().position(|v| !v.is_finite()) {
        return Err(CcsError::FileFormat(format!("row {row}, {name}: value is not finite")).into());
    }
    Ok(values)
}
