use thiserror::Error;

use super::model::{Column, ColumnType, Dataset};

// ---------------------------------------------------------------------------
// Summary types
// ---------------------------------------------------------------------------

/// A column declared numeric held a value with no numeric interpretation.
/// Cannot occur for datasets produced by the loader's type inference.
#[derive(Debug, Error)]
#[error("column '{column}' is declared {dtype} but holds non-numeric value '{value}'")]
pub struct InvalidColumnError {
    pub column: String,
    pub dtype: ColumnType,
    pub value: String,
}

/// Numeric descriptive statistics, each rounded to 2 decimal places.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub mean: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

/// Read-only per-column summary. `numeric` is `Some` only for integer and
/// float columns with at least one non-missing entry; everything else
/// reports the numeric fields as absent, never as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub dtype: ColumnType,
    pub count: usize,
    pub numeric: Option<NumericSummary>,
}

// ---------------------------------------------------------------------------
// Deriver
// ---------------------------------------------------------------------------

/// Derive one [`ColumnSummary`] per column, preserving column order.
///
/// Pure function of the dataset: no caching, no side effects. Missing
/// entries are excluded from every numeric field.
pub fn summarize(dataset: &Dataset) -> Result<Vec<ColumnSummary>, InvalidColumnError> {
    dataset
        .columns
        .iter()
        .map(|col| {
            let count = col.values.iter().filter(|v| !v.is_null()).count();
            let numeric = if col.dtype.is_numeric() {
                numeric_summary(col)?
            } else {
                None
            };
            Ok(ColumnSummary {
                name: col.name.clone(),
                dtype: col.dtype,
                count,
                numeric,
            })
        })
        .collect()
}

fn numeric_summary(col: &Column) -> Result<Option<NumericSummary>, InvalidColumnError> {
    let mut values = Vec::with_capacity(col.values.len());
    for v in &col.values {
        if v.is_null() {
            continue;
        }
        match v.as_f64() {
            Some(x) => values.push(x),
            None => {
                return Err(InvalidColumnError {
                    column: col.name.clone(),
                    dtype: col.dtype,
                    value: v.to_string(),
                })
            }
        }
    }
    if values.is_empty() {
        return Ok(None);
    }
    values.sort_by(f64::total_cmp);

    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    Ok(Some(NumericSummary {
        mean: round2(mean),
        min: round2(values[0]),
        p25: round2(percentile(&values, 25.0)),
        p50: round2(percentile(&values, 50.0)),
        p75: round2(percentile(&values, 75.0)),
        max: round2(values[n - 1]),
    }))
}

/// Percentile by linear interpolation between ranked values, the
/// conventional "linear" quantile method (numpy's default).
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

/// Round to 2 decimal places, half away from zero.
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn int_column(name: &str, values: &[i64]) -> Column {
        Column::new(
            name,
            ColumnType::Integer,
            values.iter().map(|&i| CellValue::Integer(i)).collect(),
        )
    }

    #[test]
    fn one_to_four_matches_known_statistics() {
        let ds = Dataset::from_columns(vec![int_column("v", &[1, 2, 3, 4])]);
        let summaries = summarize(&ds).unwrap();
        let num = summaries[0].numeric.as_ref().unwrap();
        assert_eq!(num.mean, 2.5);
        assert_eq!(num.min, 1.0);
        assert_eq!(num.max, 4.0);
        assert_eq!(num.p25, 1.75);
        assert_eq!(num.p50, 2.5);
        assert_eq!(num.p75, 3.25);
        assert_eq!(summaries[0].count, 4);
    }

    #[test]
    fn one_summary_per_column_in_order() {
        let ds = Dataset::from_columns(vec![
            int_column("z", &[1]),
            Column::new("a", ColumnType::Text, vec![CellValue::Text("x".into())]),
            int_column("m", &[2]),
        ]);
        let summaries = summarize(&ds).unwrap();
        let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn text_column_has_no_numeric_fields() {
        let ds = Dataset::from_columns(vec![Column::new(
            "t",
            ColumnType::Text,
            vec![
                CellValue::Text("1".into()),
                CellValue::Text("2".into()),
                CellValue::Null,
            ],
        )]);
        let summaries = summarize(&ds).unwrap();
        assert_eq!(summaries[0].count, 2);
        assert!(summaries[0].numeric.is_none());
    }

    #[test]
    fn bool_and_date_columns_are_not_numeric() {
        let ds = Dataset::from_columns(vec![
            Column::new("b", ColumnType::Bool, vec![CellValue::Bool(true)]),
            Column::new("d", ColumnType::Date, vec![CellValue::Date("2021-01-01".into())]),
        ]);
        let summaries = summarize(&ds).unwrap();
        assert!(summaries.iter().all(|s| s.numeric.is_none()));
    }

    #[test]
    fn all_missing_numeric_column_reports_absent_fields() {
        let ds = Dataset::from_columns(vec![Column::new(
            "v",
            ColumnType::Float,
            vec![CellValue::Null, CellValue::Null],
        )]);
        let summaries = summarize(&ds).unwrap();
        assert_eq!(summaries[0].count, 0);
        assert!(summaries[0].numeric.is_none());
    }

    #[test]
    fn missing_entries_are_excluded() {
        let ds = Dataset::from_columns(vec![Column::new(
            "v",
            ColumnType::Integer,
            vec![
                CellValue::Integer(1),
                CellValue::Null,
                CellValue::Integer(3),
            ],
        )]);
        let summaries = summarize(&ds).unwrap();
        assert_eq!(summaries[0].count, 2);
        let num = summaries[0].numeric.as_ref().unwrap();
        assert_eq!(num.mean, 2.0);
        assert_eq!(num.min, 1.0);
        assert_eq!(num.max, 3.0);
    }

    #[test]
    fn results_are_rounded_to_two_decimals() {
        let ds = Dataset::from_columns(vec![int_column("v", &[1, 2, 2])]);
        let summaries = summarize(&ds).unwrap();
        // 5/3 = 1.666… rounds to 1.67.
        assert_eq!(summaries[0].numeric.as_ref().unwrap().mean, 1.67);
    }

    #[test]
    fn single_value_column() {
        let ds = Dataset::from_columns(vec![int_column("v", &[7])]);
        let num = summarize(&ds).unwrap()[0].numeric.clone().unwrap();
        assert_eq!(num.mean, 7.0);
        assert_eq!(num.p25, 7.0);
        assert_eq!(num.p50, 7.0);
        assert_eq!(num.p75, 7.0);
    }

    #[test]
    fn summarize_is_idempotent() {
        let ds = Dataset::from_columns(vec![
            int_column("v", &[4, 1, 3, 2]),
            Column::new("t", ColumnType::Text, vec![CellValue::Text("x".into()); 4]),
        ]);
        assert_eq!(summarize(&ds).unwrap(), summarize(&ds).unwrap());
    }

    #[test]
    fn csv_upload_summarizes_end_to_end() {
        let ds = crate::data::loader::parse_bytes(b"a,b\n1,x\n2,y\n3,z\n", "upload.csv").unwrap();
        let summaries = summarize(&ds).unwrap();
        assert_eq!(summaries.len(), 2);

        let a = &summaries[0];
        assert_eq!(a.name, "a");
        assert_eq!(a.dtype, ColumnType::Integer);
        assert_eq!(a.count, 3);
        let num = a.numeric.as_ref().unwrap();
        assert_eq!(num.mean, 2.0);
        assert_eq!(num.min, 1.0);
        assert_eq!(num.max, 3.0);

        let b = &summaries[1];
        assert_eq!(b.name, "b");
        assert_eq!(b.count, 3);
        assert!(b.numeric.is_none());
    }

    #[test]
    fn numeric_column_with_text_value_is_invalid() {
        let ds = Dataset::from_columns(vec![Column::new(
            "v",
            ColumnType::Integer,
            vec![CellValue::Integer(1), CellValue::Text("oops".into())],
        )]);
        let err = summarize(&ds).unwrap_err();
        assert_eq!(err.column, "v");
        assert_eq!(err.value, "oops");
    }
}
