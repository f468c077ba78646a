use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::error::TableError;

// ---------------------------------------------------------------------------
// Value – a single cell of a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the common Pandas dtypes.
/// Sorted/hashed downstream (value counts, distinct counts) so `Value` must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put Value in ordered sets --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.4}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl Value {
    /// Numeric view of the cell; `None` for nulls, text and booleans.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) if v.is_nan() => None,
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Text used when a column falls back to the object dtype.
    fn into_text(self) -> Value {
        match self {
            Value::Integer(i) => Value::String(i.to_string()),
            Value::Float(v) => Value::String(v.to_string()),
            Value::Bool(b) => Value::String(b.to_string()),
            other => other,
        }
    }
}

// ---------------------------------------------------------------------------
// DType – the logical storage type of a column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DType {
    Int64,
    Float64,
    Bool,
    Object,
}

impl DType {
    pub fn is_numeric(self) -> bool {
        matches!(self, DType::Int64 | DType::Float64)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Int64 => "int64",
            DType::Float64 => "float64",
            DType::Bool => "bool",
            DType::Object => "object",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// A named, homogeneously typed sequence of cells.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub dtype: DType,
    pub values: Vec<Value>,
}

impl Column {
    /// Build a column from loosely typed cells, inferring a single dtype.
    ///
    /// * only integers (no nulls) → `int64`
    /// * integers/floats, or integers with nulls → `float64`
    /// * only booleans → `bool`
    /// * anything else → `object`, every non-null cell becomes text
    pub fn infer(name: impl Into<String>, cells: Vec<Value>) -> Self {
        let mut has_int = false;
        let mut has_float = false;
        let mut has_bool = false;
        let mut has_text = false;
        let mut has_null = false;

        for cell in &cells {
            match cell {
                Value::Integer(_) => has_int = true,
                Value::Float(v) if v.is_nan() => has_null = true,
                Value::Float(_) => has_float = true,
                Value::Bool(_) => has_bool = true,
                Value::String(_) => has_text = true,
                Value::Null => has_null = true,
            }
        }

        let dtype = if has_text || (has_bool && (has_int || has_float)) {
            DType::Object
        } else if has_bool {
            DType::Bool
        } else if has_float || (has_int && has_null) {
            DType::Float64
        } else if has_int {
            DType::Int64
        } else {
            // all-null column: pandas reads these as float64
            DType::Float64
        };

        let values = match dtype {
            DType::Float64 => cells
                .into_iter()
                .map(|c| match c {
                    Value::Integer(i) => Value::Float(i as f64),
                    Value::Float(v) if v.is_nan() => Value::Null,
                    other => other,
                })
                .collect(),
            DType::Object => cells.into_iter().map(Value::into_text).collect(),
            DType::Int64 | DType::Bool => cells,
        };

        Column {
            name: name.into(),
            dtype,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Number of distinct non-null values.
    pub fn n_unique(&self) -> usize {
        self.values
            .iter()
            .filter(|v| !v.is_null())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Positional numeric view; `None` marks a missing (or non-numeric) cell.
    pub fn to_f64(&self) -> Vec<Option<f64>> {
        self.values.iter().map(Value::as_f64).collect()
    }

    /// Non-missing numeric values in row order.
    pub fn present_f64(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_f64).collect()
    }

    /// Approximate deep memory footprint in bytes, following the Pandas
    /// accounting: fixed 8 bytes per numeric cell, 1 per bool, and a
    /// boxed Python-string estimate per object cell.
    pub fn memory_bytes(&self) -> usize {
        match self.dtype {
            DType::Int64 | DType::Float64 => 8 * self.len(),
            DType::Bool => self.len(),
            DType::Object => self
                .values
                .iter()
                .map(|v| match v {
                    Value::String(s) => 8 + 49 + s.len(),
                    _ => 8 + 16,
                })
                .sum(),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the loaded dataset
// ---------------------------------------------------------------------------

/// An ordered collection of equally long, uniquely named columns.
/// Read-only once built; row selections produce new tables.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);

        let mut seen = HashSet::new();
        for col in &columns {
            if col.len() != n_rows {
                return Err(TableError::RaggedColumn {
                    column: col.name.clone(),
                    expected: n_rows,
                    found: col.len(),
                });
            }
            if !seen.insert(col.name.as_str()) {
                return Err(TableError::DuplicateColumn(col.name.clone()));
            }
        }

        Ok(Table { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Total missing cells across the whole table.
    pub fn total_nulls(&self) -> usize {
        self.columns.iter().map(Column::null_count).sum()
    }

    /// Derive a table holding the given rows, in the given order.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                dtype: c.dtype,
                values: indices
                    .iter()
                    .filter_map(|&i| c.values.get(i).cloned())
                    .collect(),
            })
            .collect();
        let n_rows = indices.iter().filter(|&&i| i < self.n_rows).count();
        Table { columns, n_rows }
    }

    /// Derive a table with only the named columns, in the given order.
    /// Unknown names are skipped.
    pub fn select(&self, names: &[String]) -> Table {
        let columns: Vec<Column> = names
            .iter()
            .filter_map(|n| self.column(n).cloned())
            .collect();
        let n_rows = if columns.is_empty() { 0 } else { self.n_rows };
        Table { columns, n_rows }
    }

    pub fn head(&self, n: usize) -> Table {
        let idx: Vec<usize> = (0..n.min(self.n_rows)).collect();
        self.take_rows(&idx)
    }

    pub fn tail(&self, n: usize) -> Table {
        let start = self.n_rows.saturating_sub(n);
        let idx: Vec<usize> = (start..self.n_rows).collect();
        self.take_rows(&idx)
    }

    /// Cell text for row `row` across all columns (used by table widgets).
    pub fn row_text(&self, row: usize) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| match c.values.get(row) {
                Some(Value::Null) | None => String::new(),
                Some(v) => v.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(v: &[i64]) -> Vec<Value> {
        v.iter().map(|&i| Value::Integer(i)).collect()
    }

    #[test]
    fn infers_integer_column() {
        let col = Column::infer("population", ints(&[10, 20, 30]));
        assert_eq!(col.dtype, DType::Int64);
        assert!(col.dtype.is_numeric());
    }

    #[test]
    fn integers_with_nulls_become_float() {
        let col = Column::infer(
            "weight",
            vec![Value::Integer(1), Value::Null, Value::Integer(3)],
        );
        assert_eq!(col.dtype, DType::Float64);
        assert_eq!(col.values[0], Value::Float(1.0));
        assert_eq!(col.null_count(), 1);
    }

    #[test]
    fn mixed_text_falls_back_to_object() {
        let col = Column::infer(
            "status",
            vec![Value::String("EN".into()), Value::Integer(3), Value::Null],
        );
        assert_eq!(col.dtype, DType::Object);
        assert_eq!(col.values[1], Value::String("3".into()));
        assert!(col.values[2].is_null());
        assert!(!col.dtype.is_numeric());
    }

    #[test]
    fn unique_count_ignores_nulls() {
        let col = Column::infer(
            "continent",
            vec![
                Value::String("Asia".into()),
                Value::Null,
                Value::String("Asia".into()),
                Value::String("Africa".into()),
            ],
        );
        assert_eq!(col.n_unique(), 2);
    }

    #[test]
    fn ragged_table_is_rejected() {
        let err = Table::new(vec![
            Column::infer("a", ints(&[1, 2])),
            Column::infer("b", ints(&[1])),
        ])
        .unwrap_err();
        assert!(matches!(err, TableError::RaggedColumn { .. }));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = Table::new(vec![
            Column::infer("a", ints(&[1])),
            Column::infer("a", ints(&[2])),
        ])
        .unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumn(name) if name == "a"));
    }

    #[test]
    fn head_and_tail_derive_new_tables() {
        let table = Table::new(vec![Column::infer("a", ints(&[1, 2, 3, 4]))]).unwrap();
        assert_eq!(table.head(2).column("a").unwrap().values, ints(&[1, 2]));
        assert_eq!(table.tail(3).column("a").unwrap().values, ints(&[2, 3, 4]));
        assert_eq!(table.tail(10).n_rows(), 4);
        assert_eq!(table.n_rows(), 4);
    }
}
