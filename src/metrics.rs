//! Read-only quality metrics of a table.
use crate::table::Table;
use serde::Serialize;
use std::fmt::Display;

/// Missing-value count of one column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MissingCount {
    pub column: String,
    pub count: usize,
}

/// Shape, duplicate rows and missing values of a table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub row_count: usize,
    pub column_count: usize,
    /// Rows identical to an earlier row across all columns
    pub duplicate_count: usize,
    /// Per column, in column order
    pub missing_values: Vec<MissingCount>,
}

impl Metrics {
    pub fn total_missing(&self) -> usize {
        self.missing_values.iter().map(|missing| missing.count).sum()
    }

    /// Missing-value count of the named column.
    pub fn missing_for(&self, column: &str) -> Option<usize> {
        self.missing_values
            .iter()
            .find(|missing| missing.column == column)
            .map(|missing| missing.count)
    }
}

/// Computes the metrics of the table.
pub fn metrics(table: &Table) -> Metrics {
    Metrics {
        row_count: table.row_count(),
        column_count: table.column_count(),
        duplicate_count: table.first_occurrences().into_iter().filter(|first| !first).count(),
        missing_values: table
            .columns()
            .iter()
            .map(|column| MissingCount {
                column: column.name().to_owned(),
                count: column.missing_count(),
            })
            .collect(),
    }
}

impl Display for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Rows:           {}", self.row_count)?;
        writeln!(f, "Columns:        {}", self.column_count)?;
        writeln!(f, "Duplicate Rows: {}", self.duplicate_count)?;
        writeln!(f, "Missing Values per Column:")?;
        let width = self
            .missing_values
            .iter()
            .map(|missing| missing.column.chars().count())
            .max()
            .unwrap_or(0);
        for missing in &self.missing_values {
            writeln!(f, "  {:<width$}  {}", missing.column, missing.count, width = width)?;
        }
        Ok(())
    }
}
