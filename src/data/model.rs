use std::fmt;

use serde_json::{Map, Number, Value as JsonValue};

// ---------------------------------------------------------------------------
// CellValue – a single cell of the uploaded sheet
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common spreadsheet dtypes.
/// Location values are collected into ordered sets, so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date string kept as text for simplicity.
    Date(String),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet / BTreeMap keys --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for metric aggregation.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if !v.is_nan() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
            _ => None,
        }
    }

    /// Interpret the value as a calendar year.
    ///
    /// Spreadsheet readers often hand back `2021.0` for integer cells, so
    /// whole floats are accepted too.
    pub fn as_year(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            CellValue::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// JSON representation used by the table excerpt.
    pub fn to_json(&self) -> JsonValue {
        match self {
            CellValue::String(s) | CellValue::Date(s) => JsonValue::String(s.clone()),
            CellValue::Integer(i) => JsonValue::from(*i),
            CellValue::Float(v) => Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            CellValue::Bool(b) => JsonValue::Bool(*b),
            CellValue::Null => JsonValue::Null,
        }
    }
}

// ---------------------------------------------------------------------------
// Header normalisation
// ---------------------------------------------------------------------------

/// Canonical form of a header label: trimmed and lower-cased.
pub fn normalize_header(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Normalise every header, suffixing repeats (`rate`, `rate.1`, …) so the
/// resulting names stay unique in column order.
pub fn normalize_headers<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let base = normalize_header(label.as_ref());
        let mut name = base.clone();
        let mut n = 1;
        while seen.contains(&name) {
            name = format!("{base}.{n}");
            n += 1;
        }
        seen.push(name);
    }
    seen
}

// ---------------------------------------------------------------------------
// Dataset – the complete parsed sheet
// ---------------------------------------------------------------------------

/// One row of the sheet; `values[i]` belongs to `Dataset::columns[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub values: Vec<CellValue>,
}

/// The full parsed table with normalised column names.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Header labels exactly as they appeared in the upload.
    pub raw_columns: Vec<String>,
    /// Normalised, unique column names in sheet order.
    pub columns: Vec<String>,
    /// All rows in on-disk order.
    pub rows: Vec<Row>,
}

impl Dataset {
    /// Build a dataset from raw headers and row cells. Short rows are padded
    /// with `Null`, long rows truncated to the header width.
    pub fn new(raw_columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let columns = normalize_headers(&raw_columns);
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut values| {
                values.resize(width, CellValue::Null);
                Row { values }
            })
            .collect();
        Dataset {
            raw_columns,
            columns,
            rows,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a normalised column name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// A new dataset holding only the rows at `indices`, in that order.
    pub fn select_rows(&self, indices: &[usize]) -> Dataset {
        Dataset {
            raw_columns: self.raw_columns.clone(),
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// Rewrite every cell of `column` as trimmed text.
    pub fn trim_column_as_text(&mut self, column: &str) {
        let Some(idx) = self.column_index(column) else {
            return;
        };
        for row in &mut self.rows {
            let text = row.values[idx].to_string().trim().to_string();
            row.values[idx] = CellValue::String(text);
        }
    }

    /// Distinct non-empty values of a column in order of first appearance.
    pub fn distinct_text(&self, column: &str) -> Vec<String> {
        let Some(idx) = self.column_index(column) else {
            return Vec::new();
        };
        let mut out: Vec<String> = Vec::new();
        for row in &self.rows {
            let text = row.values[idx].to_string();
            if !text.is_empty() && !out.contains(&text) {
                out.push(text);
            }
        }
        out
    }

    /// Years of all rows that carry one, in row order.
    pub fn years(&self) -> Vec<i64> {
        match self.column_index("year") {
            Some(idx) => self
                .rows
                .iter()
                .filter_map(|r| r.values[idx].as_year())
                .collect(),
            None => Vec::new(),
        }
    }

    /// The first `limit` rows as ordered JSON records keyed by column name.
    pub fn records(&self, limit: usize) -> Vec<Map<String, JsonValue>> {
        self.rows
            .iter()
            .take(limit)
            .map(|row| {
                self.columns
                    .iter()
                    .zip(&row.values)
                    .map(|(col, val)| (col.clone(), val.to_json()))
                    .collect()
            })
            .collect()
    }
}
