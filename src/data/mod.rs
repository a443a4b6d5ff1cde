//! `Table` module for named-column side data attached to triangles.
//!
//! Provides a minimal column container with the canonical text-record
//! contract used by triangle documents (columns-orient JSON). Heavy data
//! wrangling belongs upstream.

use crate::error::{CadenaError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// A minimal table with named, equal-length `f64` columns.
///
/// This is a thin wrapper around `Vec<(String, Vec<f64>)>` preserving
/// column order. Missing cells are NaN.
///
/// # Examples
///
/// ```
/// use cadena::data::Table;
///
/// let table = Table::new(vec![
///     ("x".to_string(), vec![1.0, 2.0, 3.0]),
///     ("y".to_string(), vec![4.0, 5.0, 6.0]),
/// ]).expect("valid columns");
/// assert_eq!(table.shape(), (3, 2));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<(String, Vec<f64>)>,
    n_rows: usize,
}

impl Table {
    /// Creates a table from named columns.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no columns, column lengths differ,
    /// a name is empty, or names repeat.
    pub fn new(columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        if columns.is_empty() {
            return Err("Table must have at least one column".into());
        }

        let n_rows = columns[0].1.len();
        for (name, col) in &columns {
            if col.len() != n_rows {
                return Err("All columns must have the same length".into());
            }
            if name.is_empty() {
                return Err("Column names cannot be empty".into());
            }
        }

        let mut names: Vec<&str> = columns.iter().map(|(n, _)| n.as_str()).collect();
        names.sort_unstable();
        for i in 1..names.len() {
            if names[i] == names[i - 1] {
                return Err("Duplicate column names not allowed".into());
            }
        }

        Ok(Self { columns, n_rows })
    }

    /// Promotes a one-dimensional sequence to a one-column table.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty.
    pub fn single_column(name: &str, values: Vec<f64>) -> Result<Self> {
        Self::new(vec![(name.to_string(), values)])
    }

    /// Returns the shape as (`n_rows`, `n_cols`).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }

    /// Returns the column names in order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Returns a reference to a column by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the column doesn't exist.
    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
            .ok_or_else(|| "Column not found".into())
    }

    /// Encodes the table in its canonical text-record form.
    ///
    /// Columns-orient JSON: `{"col": {"0": v0, "1": v1, ...}}` with row
    /// keys as stringified indices. NaN cells encode as `null`.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON encoding fails.
    pub fn to_record_json(&self) -> Result<String> {
        let mut doc = Map::new();
        for (name, col) in &self.columns {
            let mut rows = Map::new();
            for (idx, value) in col.iter().enumerate() {
                let cell = Number::from_f64(*value).map_or(Value::Null, Value::Number);
                rows.insert(idx.to_string(), cell);
            }
            doc.insert(name.clone(), Value::Object(rows));
        }
        Ok(serde_json::to_string(&Value::Object(doc))?)
    }

    /// Decodes a table from its canonical text-record form.
    ///
    /// # Errors
    ///
    /// Returns a schema error if the document is not a columns-orient
    /// object of numeric (or null) cells with dense `0..n` row keys.
    pub fn from_record_json(document: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(document)?;
        let Value::Object(cols) = root else {
            return Err(CadenaError::schema("table", "expected top-level object"));
        };

        let mut columns = Vec::with_capacity(cols.len());
        for (name, rows) in cols {
            let Value::Object(rows) = rows else {
                return Err(CadenaError::schema(
                    &name,
                    "expected an object of row-index keys",
                ));
            };
            let mut col = vec![f64::NAN; rows.len()];
            for (key, cell) in &rows {
                let idx: usize = key.parse().map_err(|_| {
                    CadenaError::schema(&name, format!("row key '{key}' is not an index"))
                })?;
                if idx >= col.len() {
                    return Err(CadenaError::schema(
                        &name,
                        format!("row key '{key}' out of range for {} rows", col.len()),
                    ));
                }
                col[idx] = match cell {
                    Value::Null => f64::NAN,
                    Value::Number(n) => n.as_f64().ok_or_else(|| {
                        CadenaError::schema(&name, format!("row {idx} is not an f64"))
                    })?,
                    other => {
                        return Err(CadenaError::schema(
                            &name,
                            format!("row {idx}: expected number or null, got {other}"),
                        ))
                    }
                };
            }
            columns.push((name, col));
        }
        Self::new(columns)
    }
}
