use std::fmt;

use chrono::{DateTime, Local};

// ---------------------------------------------------------------------------
// CellValue – a single cell in a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date string kept as text for simplicity.
    Date(String),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, ""),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for numeric summaries.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Whether the cell is missing.
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// ColumnType – declared type of a whole column
// ---------------------------------------------------------------------------

/// The declared scalar type of a column, as inferred during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    Bool,
    Date,
}

impl ColumnType {
    /// Whether summary statistics carry numeric fields for this type.
    /// Only the two numeric dtypes qualify; Bool and Date do not.
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
            ColumnType::Bool => "bool",
            ColumnType::Date => "date",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Column – one named column of the Dataset
// ---------------------------------------------------------------------------

/// A named column: declared type plus ordered cell values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub dtype: ColumnType,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: ColumnType, values: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            dtype,
            values,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete parsed table
// ---------------------------------------------------------------------------

/// The full parsed dataset: an ordered sequence of named columns.
///
/// Invariants (upheld by the loader, the only producer): all columns have
/// the same length, and column names are unique within the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub columns: Vec<Column>,
}

impl Dataset {
    pub fn from_columns(columns: Vec<Column>) -> Self {
        debug_assert!(
            columns
                .windows(2)
                .all(|w| w[0].values.len() == w[1].values.len()),
            "all columns must have equal length"
        );
        Dataset { columns }
    }

    /// Number of rows (length of any column; 0 for a column-less dataset).
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the dataset holds no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in dataset order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// UploadSession – one opened file
// ---------------------------------------------------------------------------

/// A successfully opened file: the parsed dataset plus file metadata.
/// Sessions are replaced wholesale on each open, never merged.
#[derive(Debug, Clone)]
pub struct UploadSession {
    pub filename: String,
    pub modified: Option<DateTime<Local>>,
    pub dataset: Dataset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_f64_covers_both_numeric_variants() {
        assert_eq!(CellValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(CellValue::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(CellValue::Text("3".into()).as_f64(), None);
        assert_eq!(CellValue::Bool(true).as_f64(), None);
        assert_eq!(CellValue::Null.as_f64(), None);
    }

    #[test]
    fn dataset_shape_accessors() {
        let ds = Dataset::from_columns(vec![
            Column::new(
                "a",
                ColumnType::Integer,
                vec![CellValue::Integer(1), CellValue::Integer(2)],
            ),
            Column::new(
                "b",
                ColumnType::Text,
                vec![CellValue::Text("x".into()), CellValue::Null],
            ),
        ]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column_names(), vec!["a", "b"]);
    }

    #[test]
    fn empty_dataset_has_zero_rows() {
        let ds = Dataset::from_columns(Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.row_count(), 0);
    }
}
