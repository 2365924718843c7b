use std::collections::HashSet;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data as ExcelData, Reader};
use chrono::NaiveDate;
use serde_json::{Map as JsonMap, Value as JsonValue};
use thiserror::Error;

use super::model::{CellValue, Column, ColumnType, Dataset};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Parsing failed: unsupported or malformed file. No partial Dataset is ever
/// produced on failure.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported file type: {0}")]
    UnsupportedExtension(String),
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid spreadsheet: {0}")]
    Excel(#[from] calamine::Error),
    #[error("file is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("{0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

type ParserFn = fn(&[u8]) -> Result<Dataset, ParseError>;

/// Format dispatch: filename substring → parser, first match wins.
/// No content-based sniffing.
const PARSERS: &[(&str, ParserFn)] = &[
    ("csv", parse_csv),
    ("xls", parse_excel),
    ("json", parse_json),
];

/// Parse raw uploaded bytes into a [`Dataset`], choosing the format from the
/// filename.
///
/// Supported formats:
/// * `csv`  – comma-separated text with a header row
/// * `xls`  – spreadsheet binary (xlsx/xls/ods, first sheet only)
/// * `json` – array of objects, object of column arrays, or one object per line
pub fn parse_bytes(bytes: &[u8], filename: &str) -> Result<Dataset, ParseError> {
    let lower = filename.to_ascii_lowercase();
    let parser = PARSERS
        .iter()
        .find(|(tag, _)| lower.contains(tag))
        .map(|(_, f)| f);

    match parser {
        Some(f) => f(bytes),
        None => Err(ParseError::UnsupportedExtension(filename.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Type inference
// ---------------------------------------------------------------------------

/// Infer a cell value from CSV text: empty → Null, then i64, f64, bool,
/// ISO date, falling back to text. A parsed NaN counts as missing.
fn infer_cell(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        if f.is_nan() {
            return CellValue::Null;
        }
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() {
        return CellValue::Date(s.to_string());
    }
    CellValue::Text(s.to_string())
}

fn scalar_type(v: &CellValue) -> Option<ColumnType> {
    match v {
        CellValue::Integer(_) => Some(ColumnType::Integer),
        CellValue::Float(_) => Some(ColumnType::Float),
        CellValue::Text(_) => Some(ColumnType::Text),
        CellValue::Bool(_) => Some(ColumnType::Bool),
        CellValue::Date(_) => Some(ColumnType::Date),
        CellValue::Null => None,
    }
}

/// Unify the declared type of a column over its cells. Integer and Float
/// merge to Float; any other disagreement demotes to Text. A column with
/// only missing cells is Float, matching the Pandas convention.
fn unify_column_type(values: &[CellValue]) -> ColumnType {
    let mut acc: Option<ColumnType> = None;
    for t in values.iter().filter_map(scalar_type) {
        acc = Some(match acc {
            None => t,
            Some(a) if a == t => a,
            Some(a) if a.is_numeric() && t.is_numeric() => ColumnType::Float,
            Some(_) => ColumnType::Text,
        });
    }
    acc.unwrap_or(ColumnType::Float)
}

fn ensure_unique_names(names: &[String]) -> Result<(), ParseError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(ParseError::Malformed(format!(
                "duplicate column name '{name}'"
            )));
        }
    }
    Ok(())
}

fn build_dataset(names: Vec<String>, mut cells: Vec<Vec<CellValue>>) -> Result<Dataset, ParseError> {
    ensure_unique_names(&names)?;
    let columns = names
        .into_iter()
        .zip(cells.drain(..))
        .map(|(name, values)| {
            let dtype = unify_column_type(&values);
            Column::new(name, dtype, values)
        })
        .collect();
    Ok(Dataset::from_columns(columns))
}

// ---------------------------------------------------------------------------
// CSV parser
// ---------------------------------------------------------------------------

fn parse_csv(bytes: &[u8]) -> Result<Dataset, ParseError> {
    let mut reader = csv::Reader::from_reader(bytes);
    let names: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); names.len()];
    for result in reader.records() {
        let record = result?;
        for (i, col) in cells.iter_mut().enumerate() {
            col.push(infer_cell(record.get(i).unwrap_or("")));
        }
    }
    build_dataset(names, cells)
}

// ---------------------------------------------------------------------------
// Excel parser
// ---------------------------------------------------------------------------

/// Read the first sheet of a workbook. The first row is the header;
/// unnamed header cells get a positional name.
fn parse_excel(bytes: &[u8]) -> Result<Dataset, ParseError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ParseError::Malformed("workbook has no sheets".to_string()))??;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| ParseError::Malformed("sheet is empty".to_string()))?;

    let names: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            ExcelData::Empty => format!("column_{i}"),
            other => other.to_string(),
        })
        .collect();

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (i, col) in cells.iter_mut().enumerate() {
            col.push(excel_cell(row.get(i).unwrap_or(&ExcelData::Empty)));
        }
    }
    build_dataset(names, cells)
}

fn excel_cell(data: &ExcelData) -> CellValue {
    match data {
        ExcelData::Empty => CellValue::Null,
        ExcelData::String(s) => CellValue::Text(s.clone()),
        ExcelData::Int(i) => CellValue::Integer(*i),
        ExcelData::Float(f) if f.is_nan() => CellValue::Null,
        ExcelData::Float(f) => CellValue::Float(*f),
        ExcelData::Bool(b) => CellValue::Bool(*b),
        ExcelData::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::Date(naive.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => CellValue::Null,
        },
        ExcelData::DateTimeIso(s) | ExcelData::DurationIso(s) => CellValue::Date(s.clone()),
        ExcelData::Error(_) => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// JSON parser
// ---------------------------------------------------------------------------

/// Accepted shapes, tried in order:
///
/// ```json
/// [{ "a": 1, "b": "x" }, { "a": 2, "b": "y" }]   // records
/// { "a": [1, 2], "b": ["x", "y"] }               // column arrays
/// ```
///
/// plus one object per line (NDJSON). Column order follows the key order of
/// the first record; records may omit keys, which read as missing.
fn parse_json(bytes: &[u8]) -> Result<Dataset, ParseError> {
    let text = std::str::from_utf8(bytes)?;

    match serde_json::from_str::<JsonValue>(text.trim()) {
        Ok(JsonValue::Array(records)) => from_records(&records),
        Ok(JsonValue::Object(map)) => from_column_arrays(&map),
        Ok(_) => Err(ParseError::Malformed(
            "expected a JSON array or object at the top level".to_string(),
        )),
        // Not a single document: try line-delimited records.
        Err(_) => {
            let records: Vec<JsonValue> = text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(serde_json::from_str)
                .collect::<Result<_, _>>()?;
            from_records(&records)
        }
    }
}

fn from_records(records: &[JsonValue]) -> Result<Dataset, ParseError> {
    let mut names: Vec<String> = Vec::new();
    let mut objects: Vec<&JsonMap<String, JsonValue>> = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| ParseError::Malformed(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !names.iter().any(|n| n == key) {
                names.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::with_capacity(objects.len()); names.len()];
    for obj in objects {
        for (i, name) in names.iter().enumerate() {
            cells[i].push(obj.get(name).map_or(CellValue::Null, json_cell));
        }
    }
    build_dataset(names, cells)
}

fn from_column_arrays(map: &JsonMap<String, JsonValue>) -> Result<Dataset, ParseError> {
    let mut names = Vec::with_capacity(map.len());
    let mut cells = Vec::with_capacity(map.len());
    let mut row_count: Option<usize> = None;

    for (name, value) in map {
        let arr = value.as_array().ok_or_else(|| {
            ParseError::Malformed(format!("column '{name}' is not a JSON array"))
        })?;
        match row_count {
            None => row_count = Some(arr.len()),
            Some(n) if n != arr.len() => {
                return Err(ParseError::Malformed(format!(
                    "column '{name}' has {} rows, expected {n}",
                    arr.len()
                )));
            }
            Some(_) => {}
        }
        names.push(name.clone());
        cells.push(arr.iter().map(json_cell).collect());
    }
    build_dataset(names, cells)
}

fn json_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => {
            if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() {
                CellValue::Date(s.clone())
            } else {
                CellValue::Text(s.clone())
            }
        }
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_end_to_end() {
        let ds = parse_bytes(b"a,b\n1,x\n2,y\n3,z\n", "upload.csv").unwrap();
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.column_names(), vec!["a", "b"]);
        assert_eq!(ds.columns[0].dtype, ColumnType::Integer);
        assert_eq!(ds.columns[1].dtype, ColumnType::Text);
        assert_eq!(ds.columns[0].values[1], CellValue::Integer(2));
    }

    #[test]
    fn csv_round_trip_preserves_shape() {
        let bytes = b"name,age,height\nalice,31,1.68\nbob,27,1.82\n";
        let ds = parse_bytes(bytes, "people.csv").unwrap();
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.column_names(), vec!["name", "age", "height"]);
    }

    #[test]
    fn csv_mixed_int_float_unifies_to_float() {
        let ds = parse_bytes(b"v\n1\n2.5\n3\n", "v.csv").unwrap();
        assert_eq!(ds.columns[0].dtype, ColumnType::Float);
    }

    #[test]
    fn csv_empty_cells_become_null() {
        let ds = parse_bytes(b"a,b\n1,x\n,y\n3,z\n", "v.csv").unwrap();
        assert_eq!(ds.columns[0].values[1], CellValue::Null);
        assert_eq!(ds.columns[0].dtype, ColumnType::Integer);
    }

    #[test]
    fn csv_nan_token_is_missing() {
        let ds = parse_bytes(b"v\nNaN\n1.5\n", "v.csv").unwrap();
        assert_eq!(ds.columns[0].values[0], CellValue::Null);
        assert_eq!(ds.columns[0].dtype, ColumnType::Float);
    }

    #[test]
    fn csv_bools_and_dates_are_inferred() {
        let ds = parse_bytes(b"flag,day\ntrue,2021-03-04\nfalse,2021-03-05\n", "f.csv").unwrap();
        assert_eq!(ds.columns[0].dtype, ColumnType::Bool);
        assert_eq!(ds.columns[1].dtype, ColumnType::Date);
    }

    #[test]
    fn csv_all_missing_column_is_float() {
        let ds = parse_bytes(b"a,b\n,x\n,y\n", "v.csv").unwrap();
        assert_eq!(ds.columns[0].dtype, ColumnType::Float);
        assert_eq!(ds.row_count(), 2);
    }

    #[test]
    fn duplicate_headers_are_rejected() {
        let err = parse_bytes(b"a,a\n1,2\n", "dup.csv").unwrap_err();
        assert!(matches!(err, ParseError::Malformed(_)));
    }

    #[test]
    fn unsupported_extension_yields_no_dataset() {
        let err = parse_bytes(b"hello", "notes.txt").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedExtension(_)));
    }

    #[test]
    fn dispatch_is_substring_based_and_table_ordered() {
        // "csv" matches before "json" because of table order, not position.
        let ds = parse_bytes(b"a\n1\n", "export.json.csv").unwrap();
        assert_eq!(ds.column_names(), vec!["a"]);
        // Case-insensitive.
        assert!(parse_bytes(b"a\n1\n", "DATA.CSV").is_ok());
    }

    #[test]
    fn garbage_spreadsheet_bytes_fail() {
        assert!(parse_bytes(b"not a workbook", "report.xlsx").is_err());
    }

    #[test]
    fn json_records() {
        let bytes = br#"[{"a": 1, "b": "x"}, {"a": 2, "b": "y"}]"#;
        let ds = parse_bytes(bytes, "data.json").unwrap();
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.column_names(), vec!["a", "b"]);
        assert_eq!(ds.columns[0].dtype, ColumnType::Integer);
    }

    #[test]
    fn json_records_with_missing_keys() {
        let bytes = br#"[{"a": 1, "b": "x"}, {"a": 2}]"#;
        let ds = parse_bytes(bytes, "data.json").unwrap();
        assert_eq!(ds.columns[1].values[1], CellValue::Null);
    }

    #[test]
    fn json_column_arrays() {
        let bytes = br#"{"a": [1, 2, 3], "b": ["x", "y", "z"]}"#;
        let ds = parse_bytes(bytes, "cols.json").unwrap();
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.column_names(), vec!["a", "b"]);
    }

    #[test]
    fn json_ragged_column_arrays_fail() {
        let bytes = br#"{"a": [1, 2], "b": ["x"]}"#;
        assert!(matches!(
            parse_bytes(bytes, "cols.json").unwrap_err(),
            ParseError::Malformed(_)
        ));
    }

    #[test]
    fn json_line_delimited() {
        let bytes = b"{\"a\": 1}\n{\"a\": 2}\n{\"a\": 3}\n";
        let ds = parse_bytes(bytes, "rows.json").unwrap();
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.columns[0].dtype, ColumnType::Integer);
    }

    #[test]
    fn json_scalar_top_level_fails() {
        assert!(parse_bytes(b"42", "num.json").is_err());
    }
}
