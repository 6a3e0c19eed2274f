// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// In-memory tabular dataset shared by the scanner and the anonymizer
//
// Columns are reference counted, so deriving a dataset with one column
// replaced copies pointers instead of cells (copy-on-write).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{AnonymizeError, AnonymizeResult};

/// A single cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Null,
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text form of the value, `None` for nulls
    ///
    /// Integral numbers render without a fractional part so that `25.0`
    /// and `25` hash, tokenize and mask identically.
    pub fn render(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) => Some(render_number(*n)),
            Cell::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Cell::Date(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Null)
    }
}

fn render_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Storage type of a column, inferred from its non-null cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// No non-null cells
    Empty,
    Numeric,
    Temporal,
    Text,
    /// More than one non-null cell type
    Mixed,
}

impl ColumnKind {
    /// Text-like columns are the only ones eligible for pattern detection
    pub fn is_textual(self) -> bool {
        matches!(self, ColumnKind::Text | ColumnKind::Mixed | ColumnKind::Empty)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Empty => "empty",
            ColumnKind::Numeric => "numeric",
            ColumnKind::Temporal => "temporal",
            ColumnKind::Text => "text",
            ColumnKind::Mixed => "mixed",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, ordered sequence of cells
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    /// Build a column from any iterator of values convertible to cells
    pub fn from_values<I, T>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Cell>,
    {
        Self::new(name, values.into_iter().map(Into::into).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn non_null(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| !c.is_null())
    }

    pub fn non_null_count(&self) -> usize {
        self.non_null().count()
    }

    pub fn kind(&self) -> ColumnKind {
        let mut kind = ColumnKind::Empty;
        for cell in &self.cells {
            let cell_kind = match cell {
                Cell::Null => continue,
                Cell::Number(_) => ColumnKind::Numeric,
                Cell::Text(_) => ColumnKind::Text,
                Cell::Date(_) => ColumnKind::Temporal,
            };
            kind = match kind {
                ColumnKind::Empty => cell_kind,
                k if k == cell_kind => k,
                _ => return ColumnKind::Mixed,
            };
        }
        kind
    }

    /// Same name, new cells
    pub(crate) fn with_cells(&self, cells: Vec<Cell>) -> Self {
        Self {
            name: self.name.clone(),
            cells,
        }
    }
}

/// Ordered collection of equally long, uniquely named columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Arc<Column>>,
    rows: usize,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> AnonymizeResult<Self> {
        let rows = columns.first().map(Column::len).unwrap_or(0);
        let mut seen = HashSet::new();

        for column in &columns {
            if column.len() != rows {
                return Err(AnonymizeError::RaggedDataset {
                    column: column.name.clone(),
                    expected: rows,
                    actual: column.len(),
                });
            }
            if !seen.insert(column.name.as_str()) {
                return Err(AnonymizeError::InvalidParameter {
                    column: column.name.clone(),
                    message: "duplicate column name".to_string(),
                });
            }
        }

        Ok(Self {
            columns: columns.into_iter().map(Arc::new).collect(),
            rows,
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().map(|c| c.as_ref())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns().map(Column::name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// New dataset with the column of the same name replaced
    pub fn replace_column(&self, column: Column) -> AnonymizeResult<Self> {
        let position = self
            .columns
            .iter()
            .position(|c| c.name == column.name)
            .ok_or_else(|| AnonymizeError::ColumnNotFound(column.name.clone()))?;

        if column.len() != self.rows {
            return Err(AnonymizeError::RaggedDataset {
                column: column.name.clone(),
                expected: self.rows,
                actual: column.len(),
            });
        }

        let mut columns = self.columns.clone();
        columns[position] = Arc::new(column);
        Ok(Self {
            columns,
            rows: self.rows,
        })
    }

    /// True when both datasets hold the very same column allocation
    pub fn shares_column(&self, other: &Dataset, name: &str) -> bool {
        let find = |ds: &Dataset| ds.columns.iter().find(|c| c.name == name).cloned();
        match (find(self), find(other)) {
            (Some(a), Some(b)) => Arc::ptr_eq(&a, &b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_number() {
        assert_eq!(Cell::Number(25.0).render().unwrap(), "25");
        assert_eq!(Cell::Number(2.5).render().unwrap(), "2.5");
        assert_eq!(Cell::Null.render(), None);
    }

    #[test]
    fn test_column_kind() {
        let text = Column::from_values("a", [Some("x"), None]);
        assert_eq!(text.kind(), ColumnKind::Text);

        let numeric = Column::from_values("b", [Some(1.0), None, Some(2.0)]);
        assert_eq!(numeric.kind(), ColumnKind::Numeric);

        let mixed = Column::new("c", vec![Cell::from("x"), Cell::from(1.0)]);
        assert_eq!(mixed.kind(), ColumnKind::Mixed);

        let empty = Column::new("d", vec![Cell::Null, Cell::Null]);
        assert_eq!(empty.kind(), ColumnKind::Empty);
        assert_eq!(empty.non_null_count(), 0);
    }

    #[test]
    fn test_ragged_dataset_rejected() {
        let result = Dataset::new(vec![
            Column::from_values("a", ["x", "y"]),
            Column::from_values("b", ["z"]),
        ]);
        assert!(matches!(
            result,
            Err(AnonymizeError::RaggedDataset { actual: 1, .. })
        ));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let result = Dataset::new(vec![
            Column::from_values("a", ["x"]),
            Column::from_values("a", ["y"]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_replace_column_is_copy_on_write() {
        let original = Dataset::new(vec![
            Column::from_values("a", ["x", "y"]),
            Column::from_values("b", ["z", "w"]),
        ])
        .unwrap();

        let updated = original
            .replace_column(Column::from_values("a", ["1", "2"]))
            .unwrap();

        assert_eq!(original.column("a").unwrap().cells()[0], Cell::from("x"));
        assert_eq!(updated.column("a").unwrap().cells()[0], Cell::from("1"));
        assert!(original.shares_column(&updated, "b"));
        assert!(!original.shares_column(&updated, "a"));
    }
}
