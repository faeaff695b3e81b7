//! Grids and the builder that produces them.
//!
//! A [`Grid`] is an immutable table: grid-level meta, ordered columns (each
//! with its own meta), and ordered rows holding one value per column. Column
//! and row order is insertion order and is preserved by every encoder.
//!
//! [`GridBuilder`] is the mutable accumulator. Finalizing it with
//! [`GridBuilder::to_grid`] copies its state, so rows added afterwards never
//! show up in grids that were already produced.

use std::collections::HashSet;

use crate::error::{HaystackError, Result};
use crate::value::{validate_name, Dict, Value};

/// Zinc format version recorded in the `ver` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Version {
    V2,
    #[default]
    V3,
}

impl Version {
    pub fn as_str(self) -> &'static str {
        match self {
            Version::V2 => "2.0",
            Version::V3 => "3.0",
        }
    }

    /// Accepts exactly `"2.0"` or `"3.0"`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "2.0" => Some(Version::V2),
            "3.0" => Some(Version::V3),
            _ => None,
        }
    }
}

/// A named grid column with its meta tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Col {
    name: String,
    meta: Dict,
}

impl Col {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta(&self) -> &Dict {
        &self.meta
    }
}

/// Immutable table of tagged values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Grid {
    version: Version,
    meta: Dict,
    cols: Vec<Col>,
    rows: Vec<Vec<Value>>,
}

impl Grid {
    /// A grid with no meta, no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a grid with one row per dict. The columns are the union of all
    /// tag names, in first-seen order. Fails with
    /// [`HaystackError::NoColumns`] when there are dicts but none has a tag.
    pub fn from_dicts<'a>(meta: Dict, dicts: impl IntoIterator<Item = &'a Dict>) -> Result<Self> {
        let dicts: Vec<&Dict> = dicts.into_iter().collect();
        let mut seen = HashSet::new();
        let mut cols = Vec::new();
        for dict in &dicts {
            for name in dict.names() {
                if seen.insert(name.to_string()) {
                    cols.push(Col {
                        name: name.to_string(),
                        meta: Dict::new(),
                    });
                }
            }
        }
        if cols.is_empty() && !dicts.is_empty() {
            return Err(HaystackError::NoColumns);
        }
        let rows = dicts
            .iter()
            .map(|dict| {
                cols.iter()
                    .map(|col| dict.get(&col.name).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Ok(Self {
            version: Version::default(),
            meta,
            cols,
            rows,
        })
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn meta(&self) -> &Dict {
        &self.meta
    }

    pub fn cols(&self) -> &[Col] {
        &self.cols
    }

    pub fn col(&self, name: &str) -> Option<&Col> {
        self.cols.iter().find(|c| c.name == name)
    }

    pub fn col_index(&self, name: &str) -> Option<usize> {
        self.cols.iter().position(|c| c.name == name)
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|cells| Row {
            cols: &self.cols,
            cells,
        })
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row {
            cols: &self.cols,
            cells,
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Encode as a top-level Zinc document.
    pub fn to_zinc(&self) -> String {
        crate::zinc::encode_grid(self)
    }
}

/// One grid row: a value per column, in column order.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    cols: &'a [Col],
    cells: &'a [Value],
}

impl<'a> Row<'a> {
    /// The cell for column `name`, `None` if the grid has no such column.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.cols
            .iter()
            .position(|c| c.name == name)
            .map(|i| &self.cells[i])
    }

    /// Cells in column order.
    pub fn cells(&self) -> &'a [Value] {
        self.cells
    }

    /// `(column name, cell)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> {
        self.cols
            .iter()
            .map(|c| c.name.as_str())
            .zip(self.cells.iter())
    }

    /// The row's non-null cells as a dict.
    pub fn to_dict(&self) -> Dict {
        let mut dict = Dict::new();
        for (name, val) in self.iter() {
            if !val.is_null() {
                dict.insert(name.to_string(), val.clone());
            }
        }
        dict
    }
}

/// Mutable accumulator of grid meta, columns and rows.
///
/// # Example
///
/// ```rust
/// use haystack_core::{GridBuilder, Value};
///
/// let mut gb = GridBuilder::new();
/// gb.add_col("a").unwrap().add_col("b").unwrap();
/// gb.add_row(vec![Value::from(1.0), Value::from(2.0)]).unwrap();
/// let grid = gb.to_grid();
/// assert_eq!(grid.to_zinc(), "ver:\"3.0\"\na,b\n1,2\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct GridBuilder {
    version: Version,
    meta: Dict,
    cols: Vec<Col>,
    rows: Vec<Vec<Value>>,
}

impl GridBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_version(&mut self, version: Version) -> &mut Self {
        self.version = version;
        self
    }

    /// Replace the grid meta.
    pub fn set_meta(&mut self, meta: Dict) -> &mut Self {
        self.meta = meta;
        self
    }

    /// Add or replace one grid meta tag.
    pub fn add_meta(&mut self, name: impl Into<String>, val: Value) -> Result<&mut Self> {
        self.meta = self.meta.set(name, val)?;
        Ok(self)
    }

    pub fn add_col(&mut self, name: impl Into<String>) -> Result<&mut Self> {
        self.add_col_with_meta(name, Dict::new())
    }

    /// Append a column. Rows already added get `Null` in the new column.
    pub fn add_col_with_meta(&mut self, name: impl Into<String>, meta: Dict) -> Result<&mut Self> {
        let name = name.into();
        validate_name(&name)?;
        if self.cols.iter().any(|c| c.name == name) {
            return Err(HaystackError::DuplicateColumn(name));
        }
        self.cols.push(Col { name, meta });
        for row in &mut self.rows {
            row.push(Value::Null);
        }
        Ok(self)
    }

    /// Append a row given positionally in column order. Missing trailing
    /// cells are `Null`; more cells than columns is an error, and so is any
    /// row while there are no columns.
    pub fn add_row(&mut self, mut cells: Vec<Value>) -> Result<&mut Self> {
        if self.cols.is_empty() {
            return Err(HaystackError::NoColumns);
        }
        if cells.len() > self.cols.len() {
            return Err(HaystackError::RowLength {
                expected: self.cols.len(),
                found: cells.len(),
            });
        }
        cells.resize(self.cols.len(), Value::Null);
        self.rows.push(cells);
        Ok(self)
    }

    /// Append a row taking each column's value from `dict` by name. Tags
    /// without a matching column are ignored.
    pub fn add_dict_row(&mut self, dict: &Dict) -> Result<&mut Self> {
        if self.cols.is_empty() {
            return Err(HaystackError::NoColumns);
        }
        let cells = self
            .cols
            .iter()
            .map(|c| dict.get(&c.name).cloned().unwrap_or(Value::Null))
            .collect();
        self.rows.push(cells);
        Ok(self)
    }

    pub fn add_dict_rows<'a>(&mut self, dicts: impl IntoIterator<Item = &'a Dict>) -> Result<&mut Self> {
        for dict in dicts {
            self.add_dict_row(dict)?;
        }
        Ok(self)
    }

    pub fn num_cols(&self) -> usize {
        self.cols.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Snapshot the builder into an independent grid. The builder stays
    /// usable and later changes to it do not affect the returned grid.
    pub fn to_grid(&self) -> Grid {
        tracing::debug!(
            cols = self.cols.len(),
            rows = self.rows.len(),
            "grid builder snapshot"
        );
        Grid {
            version: self.version,
            meta: self.meta.clone(),
            cols: self.cols.clone(),
            rows: self.rows.clone(),
        }
    }

    /// Consume the builder without copying.
    pub fn build(self) -> Grid {
        Grid {
            version: self.version,
            meta: self.meta,
            cols: self.cols,
            rows: self.rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_column_is_rejected() {
        let mut gb = GridBuilder::new();
        gb.add_col("a").unwrap();
        let err = gb.add_col("a").unwrap_err();
        assert!(matches!(err, HaystackError::DuplicateColumn(name) if name == "a"));
    }

    #[test]
    fn rows_need_columns() {
        let mut gb = GridBuilder::new();
        assert!(matches!(gb.add_row(vec![]), Err(HaystackError::NoColumns)));
        assert!(matches!(gb.add_dict_row(&Dict::new()), Err(HaystackError::NoColumns)));
        assert_eq!(gb.num_rows(), 0);
    }

    #[test]
    fn late_column_pads_existing_rows() {
        let mut gb = GridBuilder::new();
        gb.add_col("a").unwrap();
        gb.add_row(vec![Value::from(1.0)]).unwrap();
        gb.add_col("b").unwrap();
        let grid = gb.build();
        assert_eq!(grid.row(0).unwrap().get("b"), Some(&Value::Null));
    }

    #[test]
    fn row_view_to_dict_skips_nulls() {
        let mut gb = GridBuilder::new();
        gb.add_col("a").unwrap().add_col("b").unwrap();
        gb.add_row(vec![Value::Marker]).unwrap();
        let grid = gb.build();
        let dict = grid.row(0).unwrap().to_dict();
        assert_eq!(dict.len(), 1);
        assert!(dict.get("a").unwrap().is_marker());
    }
}
