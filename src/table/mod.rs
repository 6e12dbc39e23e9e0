//! # Table Module
//!
//! In-memory tabular data: an ordered list of named [`Column`]s of equal length.
//! Column order and row order are preserved by every operation in this crate;
//! operations only drop rows or fill cells, never add, drop or rename columns.
pub mod column;
pub mod value;

pub use column::Column;
pub use column::ColumnType;
pub use value::Value;

use std::collections::HashSet;
use std::fmt::Display;
use thiserror::Error;

/// Errors raised while assembling a table.
#[derive(Error, Debug, PartialEq)]
pub enum TableError {
    #[error("Column '{column}' has {actual} values, expected {expected}")]
    ColumnLengthError {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Row {row} has {actual} values, expected {expected}")]
    RowWidthError {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Placeholder shown for missing cells in previews.
const MISSING_MARKER: &str = "<NA>";

/// Rows × named columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Builds a table from columns, which must all have the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(column) = columns.iter().find(|column| column.len() != expected) {
                Err(TableError::ColumnLengthError {
                    column: column.name.to_owned(),
                    expected,
                    actual: column.len(),
                })?
            }
        }
        Ok(Self { columns })
    }

    /// Builds a table from a header and row-major records.
    pub fn from_rows<S: Into<String>>(names: Vec<S>, rows: Vec<Vec<Value>>) -> Result<Self, TableError> {
        let mut columns: Vec<Column> = names
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(rows.len())))
            .collect();
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                Err(TableError::RowWidthError {
                    row: index,
                    expected: columns.len(),
                    actual: row.len(),
                })?
            }
            for (column, value) in columns.iter_mut().zip(row) {
                column.values.push(value);
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Cells of one row in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.row_count() {
            return None;
        }
        Some(self.columns.iter().map(|column| &column.values[index]).collect())
    }

    /// Iterates over rows in order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.row_count()).map(|index| self.columns.iter().map(|column| &column.values[index]).collect())
    }

    /// First `n` rows as a new table.
    pub fn head(&self, n: usize) -> Table {
        let keep: Vec<bool> = (0..self.row_count()).map(|index| index < n).collect();
        self.filter_rows(&keep)
    }

    /// Marks the first occurrence of every distinct row; repeats are false.
    pub(crate) fn first_occurrences(&self) -> Vec<bool> {
        let mut seen = HashSet::<Vec<&Value>>::with_capacity(self.row_count());
        self.rows().map(|row| seen.insert(row)).collect()
    }

    /// Keeps the rows whose mask entry is true, preserving their order.
    pub(crate) fn filter_rows(&self, keep: &[bool]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let values = column
                    .values
                    .iter()
                    .zip(keep)
                    .filter(|(_, keep)| **keep)
                    .map(|(value, _)| value.clone())
                    .collect();
                Column::new(column.name.to_owned(), values)
            })
            .collect();
        Table { columns }
    }
}

impl Display for Table {
    /// Renders the table as a left-aligned text grid with a header line.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cells: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|column| {
                column
                    .values
                    .iter()
                    .map(|value| match value {
                        Value::Missing => MISSING_MARKER.to_owned(),
                        _ => value.to_string(),
                    })
                    .collect()
            })
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .zip(&cells)
            .map(|(column, cells)| {
                cells
                    .iter()
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(column.name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(column, width)| format!("{:<width$}", column.name, width = *width))
            .collect();
        writeln!(f, "{}", header.join("  ").trim_end())?;
        for row in 0..self.row_count() {
            let line: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(cells, width)| format!("{:<width$}", cells[row], width = *width))
                .collect();
            writeln!(f, "{}", line.join("  ").trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            vec!["x", "y"],
            vec![
                vec!["a".into(), 1i64.into()],
                vec!["b".into(), Value::Missing],
                vec!["a".into(), 1i64.into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn shape() {
        let table = sample();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.column_names(), vec!["x", "y"]);
        assert_eq!(Table::default().row_count(), 0);
    }

    #[test]
    fn rows_are_column_ordered() {
        let table = sample();
        assert_eq!(table.row(1), Some(vec![&Value::from("b"), &Value::Missing]));
        assert_eq!(table.row(3), None);
        assert_eq!(table.rows().count(), 3);
    }

    #[test]
    fn ragged_input_is_rejected() {
        let error = Table::from_rows(vec!["x", "y"], vec![vec![1i64.into()]]).unwrap_err();
        assert_eq!(error, TableError::RowWidthError { row: 0, expected: 2, actual: 1 });

        let error = Table::new(vec![
            Column::new("x", vec![1i64.into()]),
            Column::new("y", vec![]),
        ])
        .unwrap_err();
        assert!(matches!(error, TableError::ColumnLengthError { expected: 1, actual: 0, .. }));
    }

    #[test]
    fn head_keeps_first_rows() {
        let head = sample().head(2);
        assert_eq!(head.row_count(), 2);
        assert_eq!(head.column("x").unwrap().values(), &[Value::from("a"), Value::from("b")]);
        assert_eq!(sample().head(10).row_count(), 3);
    }

    #[test]
    fn first_occurrences_mark_repeats() {
        assert_eq!(sample().first_occurrences(), vec![true, true, false]);
    }

    #[test]
    fn display_grid() {
        let rendered = sample().head(2).to_string();
        assert_eq!(rendered, "x  y\na  1\nb  <NA>\n");
    }
}
