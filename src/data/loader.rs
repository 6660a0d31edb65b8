use std::io::Cursor;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Date32Array, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use bytes::Bytes;
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Dataset};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse an uploaded file into a [`Dataset`].  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first worksheet, header in row 1
/// * `.csv`     – header row, one record per line
/// * `.json`    – `[{ "year": 2020, "final location": "Baner", ... }, ...]`
/// * `.parquet` – flat columns of strings, ints, floats, bools or dates
///
/// A missing or unknown extension is handed to the spreadsheet reader,
/// which sniffs the container format itself.
pub fn load_bytes(filename: &str, data: &[u8]) -> Result<Dataset> {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    log::debug!("parsing {filename} ({} bytes) as .{ext}", data.len());

    match ext.as_str() {
        "csv" => load_csv(data),
        "json" => load_json(data),
        "parquet" | "pq" => load_parquet(data),
        _ => load_workbook(data),
    }
}

/// Whether `filename` carries an extension [`load_bytes`] dispatches on
/// explicitly.
pub fn is_known_extension(filename: &str) -> bool {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    matches!(
        ext.as_str(),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" | "csv" | "json" | "parquet" | "pq"
    )
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

fn load_workbook(data: &[u8]) -> Result<Dataset> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(data.to_vec())).context("opening workbook")?;

    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("reading first worksheet")?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        bail!("worksheet is empty");
    };
    let headers: Vec<String> = header.iter().map(|c| c.to_string()).collect();

    let records = rows
        .map(|row| row.iter().map(workbook_cell).collect::<Vec<_>>())
        .filter(|cells| cells.iter().any(|c| !c.is_null()))
        .collect();

    Ok(Dataset::new(headers, records))
}

fn workbook_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => float_cell(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| CellValue::Date(d.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()))
            .unwrap_or(CellValue::Null),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Date(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

/// Whole floats become integers so years and unit counts read naturally.
fn float_cell(f: f64) -> CellValue {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        CellValue::Integer(f as i64)
    } else {
        CellValue::Float(f)
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(data: &[u8]) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(Dataset::new(headers, rows))
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, as produced by `/analyze/`'s
/// `table_data`):
///
/// ```json
/// [
///   { "year": 2020, "final location": "Baner", "flat - weighted average rate": 7100.0 },
///   ...
/// ]
/// ```
///
/// Columns are taken in order of first appearance across all records.
fn load_json(data: &[u8]) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_slice(data).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(Dataset::new(headers, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet table. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(data: &[u8]) -> Result<Dataset> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(data))
        .context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col, row))
                .collect();
            rows.push(cells);
        }
    }

    Ok(Dataset::new(headers, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => match col.as_any().downcast_ref::<StringArray>() {
            Some(s) => CellValue::String(s.value(row).to_string()),
            None => CellValue::Null,
        },
        DataType::LargeUtf8 => {
            let s = col.as_string::<i64>();
            CellValue::String(s.value(row).to_string())
        }
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|arr| CellValue::Integer(arr.value(row) as i64))
            .unwrap_or(CellValue::Null),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|arr| CellValue::Integer(arr.value(row)))
            .unwrap_or(CellValue::Null),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|arr| CellValue::Float(arr.value(row) as f64))
            .unwrap_or(CellValue::Null),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|arr| CellValue::Float(arr.value(row)))
            .unwrap_or(CellValue::Null),
        DataType::Boolean => col
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map(|arr| CellValue::Bool(arr.value(row)))
            .unwrap_or(CellValue::Null),
        DataType::Date32 => col
            .as_any()
            .downcast_ref::<Date32Array>()
            .and_then(|arr| arr.value_as_date(row))
            .map(|d| CellValue::Date(d.format("%Y-%m-%dT00:00:00.000").to_string()))
            .unwrap_or(CellValue::Null),
        other => CellValue::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_headers_are_normalised_and_types_guessed() {
        let data = b"Year, Final Location ,Flat - Weighted Average Rate\n2020,Baner,7100.5\n2021,Baner,\n";
        let ds = load_bytes("market.csv", data).unwrap();
        assert_eq!(ds.raw_columns[1], " Final Location ");
        assert_eq!(
            ds.columns,
            vec!["year", "final location", "flat - weighted average rate"]
        );
        assert_eq!(ds.rows[0].values[0], CellValue::Integer(2020));
        assert_eq!(ds.rows[0].values[2], CellValue::Float(7100.5));
        assert_eq!(ds.rows[1].values[2], CellValue::Null);
    }

    #[test]
    fn json_records_keep_first_appearance_column_order() {
        let data = br#"[{"year": 2020, "loc": "Wakad"}, {"year": 2021, "loc": "Wakad", "rate": 5.5}]"#;
        let ds = load_bytes("market.json", data).unwrap();
        assert_eq!(ds.columns, vec!["year", "loc", "rate"]);
        assert_eq!(ds.rows[0].values[2], CellValue::Null);
        assert_eq!(ds.rows[1].values[2], CellValue::Float(5.5));
    }

    #[test]
    fn json_rejects_non_array_root() {
        let err = load_bytes("market.json", br#"{"year": 2020}"#).unwrap_err();
        assert!(err.to_string().contains("Expected top-level JSON array"));
    }

    #[test]
    fn garbage_workbook_is_an_error() {
        assert!(load_bytes("market.xlsx", b"definitely not a zip").is_err());
        assert!(load_bytes("upload", b"\x00\x01\x02").is_err());
    }

    #[test]
    fn xlsx_first_sheet() {
        let data = include_bytes!("../../tests/fixtures/market.xlsx");
        let ds = load_bytes("Sample_data.xlsx", data).unwrap();
        assert_eq!(ds.raw_columns[1], "Final Location ");
        assert_eq!(ds.columns[3], "flat_sold - igr");
        assert_eq!(ds.len(), 6);
        assert_eq!(ds.rows[0].values[0], CellValue::Integer(2020));
        assert_eq!(ds.rows[1].values[2], CellValue::Float(7350.5));
        assert_eq!(ds.rows[3].values[1], CellValue::String("Koregaon Park".into()));
    }

    #[test]
    fn workbook_dates_render_as_iso_text() {
        use calamine::{ExcelDateTime, ExcelDateTimeType};

        let cell = Data::DateTime(ExcelDateTime::new(44256.5, ExcelDateTimeType::DateTime, false));
        assert_eq!(
            workbook_cell(&cell),
            CellValue::Date("2021-03-01T12:00:00.000".into())
        );

        let ds = Dataset::new(
            vec!["Year".into(), "Registered".into()],
            vec![vec![CellValue::Integer(2021), workbook_cell(&cell)]],
        );
        let records = ds.records(20);
        assert_eq!(records[0]["registered"], "2021-03-01T12:00:00.000");
    }

    #[test]
    fn parquet_columns_and_nulls() {
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("Year", DataType::Int64, false),
            Field::new("Final Location", DataType::Utf8, false),
            Field::new("Flat - Weighted Average Rate", DataType::Float64, true),
            Field::new("Launched", DataType::Date32, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![2020, 2021])),
                Arc::new(StringArray::from(vec!["Wakad", "Wakad"])),
                Arc::new(Float64Array::from(vec![Some(6400.5), None])),
                Arc::new(Date32Array::from(vec![Some(18687), None])),
            ],
        )
        .unwrap();

        let mut buf = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buf, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_bytes("market.parquet", &buf).unwrap();
        assert_eq!(
            ds.columns,
            vec!["year", "final location", "flat - weighted average rate", "launched"]
        );
        assert_eq!(ds.len(), 2);
        assert_eq!(
            ds.rows[0].values,
            vec![
                CellValue::Integer(2020),
                CellValue::String("Wakad".into()),
                CellValue::Float(6400.5),
                CellValue::Date("2021-03-01T00:00:00.000".into()),
            ]
        );
        assert_eq!(ds.rows[1].values[2], CellValue::Null);
        assert_eq!(ds.rows[1].values[3], CellValue::Null);
    }

    #[test]
    fn whole_floats_become_integers() {
        assert_eq!(float_cell(2021.0), CellValue::Integer(2021));
        assert_eq!(float_cell(7100.25), CellValue::Float(7100.25));
    }

    #[test]
    fn known_extensions() {
        assert!(is_known_extension("Sample_data.XLSX"));
        assert!(is_known_extension("a.csv"));
        assert!(!is_known_extension("notes.txt"));
    }
}
