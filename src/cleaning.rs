//! # Cleaning Operations
//!
//! Three transforms over a [`Table`], each returning the replacement table:
//!
//! - [`remove_missing`]: drops every row holding a missing value
//! - [`fill_missing`]: imputes missing values by mean, median or mode
//! - [`remove_duplicates`]: keeps the first occurrence of each distinct row
//!
//! Each is idempotent and keeps the column set and the relative order of the
//! rows it retains. [`Command`] is the closed set a caller dispatches on.
use crate::table::Column;
use crate::table::ColumnType;
use crate::table::Table;
use crate::table::Value;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;
use tracing::warn;

#[derive(Error, Debug, PartialEq)]
pub enum CleaningError {
    #[error("Unknown fill method '{0}', expected mean, median or mode")]
    UnknownFillMethod(String),
}

/// Statistic used to impute missing values.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum FillMethod {
    /// Arithmetic mean of numeric columns
    Mean,
    /// Median of numeric columns
    Median,
    /// Most frequent value of every column
    Mode,
}

impl FillMethod {
    pub const ALL: [FillMethod; 3] = [FillMethod::Mean, FillMethod::Median, FillMethod::Mode];

    /// Label shown in the method selector.
    pub const fn label(&self) -> &'static str {
        match self {
            FillMethod::Mean => "Mean (numeric)",
            FillMethod::Median => "Median (numeric)",
            FillMethod::Mode => "Mode",
        }
    }
}

impl Display for FillMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for FillMethod {
    type Err = CleaningError;

    /// Accepts the selector labels or the bare method names, case-insensitively.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|method| {
                method.label().eq_ignore_ascii_case(name)
                    || method.label().split(' ').next().is_some_and(|short| short.eq_ignore_ascii_case(name))
            })
            .ok_or_else(|| CleaningError::UnknownFillMethod(name.to_owned()))
    }
}

/// One cleaning action, applied explicitly by the caller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Command {
    RemoveMissing,
    FillMissing(FillMethod),
    RemoveDuplicates,
}

impl Command {
    /// Runs the command, producing the replacement table.
    pub fn apply(&self, table: &Table) -> Table {
        let cleaned = match self {
            Command::RemoveMissing => remove_missing(table),
            Command::FillMissing(method) => fill_missing(table, *method),
            Command::RemoveDuplicates => remove_duplicates(table),
        };
        info!(
            command = %self,
            rows_before = table.row_count(),
            rows_after = cleaned.row_count(),
            "Applied cleaning command"
        );
        cleaned
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::RemoveMissing => write!(f, "Remove Missing Values"),
            Command::FillMissing(method) => write!(f, "Handle Missing Values ({method})"),
            Command::RemoveDuplicates => write!(f, "Remove Duplicate Records"),
        }
    }
}

/// Keeps only rows without any missing value.
pub fn remove_missing(table: &Table) -> Table {
    let keep: Vec<bool> = table
        .rows()
        .map(|row| row.iter().all(|value| !value.is_missing()))
        .collect();
    table.filter_rows(&keep)
}

/// Keeps the first occurrence of each distinct row.
pub fn remove_duplicates(table: &Table) -> Table {
    table.filter_rows(&table.first_occurrences())
}

/// Imputes missing values column by column.
///
/// Mean and median only touch numeric columns. Mode touches every column and
/// leaves a column without any value unchanged.
pub fn fill_missing(table: &Table, method: FillMethod) -> Table {
    let mut filled = table.clone();
    for column in filled.columns_mut() {
        if column.missing_count() == 0 {
            continue;
        }
        match method {
            FillMethod::Mean => {
                if let Some(mean) = mean(&column.numbers()) {
                    fill_numeric(column, mean);
                }
            }
            FillMethod::Median => {
                if let Some(median) = median(column.numbers()) {
                    fill_numeric(column, median);
                }
            }
            FillMethod::Mode => match mode(column.values()) {
                Some(value) => fill_value(column, &value),
                None => warn!(column = %column.name(), "Column has no values, mode is undefined, leaving it unchanged"),
            },
        }
    }
    filled
}

fn mean(numbers: &[f64]) -> Option<f64> {
    if numbers.is_empty() {
        return None;
    }
    Some(numbers.iter().sum::<f64>() / numbers.len() as f64)
}

/// Median; an even count averages the two middle values.
fn median(mut numbers: Vec<f64>) -> Option<f64> {
    if numbers.is_empty() {
        return None;
    }
    numbers.sort_by(f64::total_cmp);
    let middle = numbers.len() / 2;
    if numbers.len() % 2 == 0 {
        Some((numbers[middle - 1] + numbers[middle]) / 2.0)
    } else {
        Some(numbers[middle])
    }
}

/// Most frequent non-missing value.
///
/// Ties go to the lowest value when the tied values share a kind, and to the
/// value seen first otherwise.
fn mode(values: &[Value]) -> Option<Value> {
    let mut counts = HashMap::<&Value, (usize, usize)>::new();
    for (index, value) in values.iter().enumerate().filter(|(_, value)| !value.is_missing()) {
        counts.entry(value).or_insert((0, index)).0 += 1;
    }
    let top = counts.values().map(|(count, _)| *count).max()?;
    let mut tied: Vec<(&Value, usize)> = counts
        .into_iter()
        .filter(|(_, (count, _))| *count == top)
        .map(|(value, (_, first))| (value, first))
        .collect();
    tied.sort_by_key(|(_, first)| *first);

    let sortable = tied.windows(2).all(|pair| sort_order(pair[0].0, pair[1].0).is_some());
    let chosen = if sortable {
        tied.iter()
            .min_by(|(value, _), (other, _)| sort_order(value, other).unwrap_or(Ordering::Equal))
    } else {
        tied.first()
    };
    chosen.map(|(value, _)| Value::clone(value))
}

/// Orders two values of the same kind; numbers compare across integer and double.
fn sort_order(value: &Value, other: &Value) -> Option<Ordering> {
    match (value, other) {
        (Value::Boolean(value), Value::Boolean(other)) => Some(value.cmp(other)),
        (Value::Integer(value), Value::Integer(other)) => Some(value.cmp(other)),
        (Value::Text(value), Value::Text(other)) => Some(value.cmp(other)),
        _ => Some(value.as_f64()?.total_cmp(&other.as_f64()?)),
    }
}

/// Fills with a statistic, keeping an integer column integral when the statistic allows it.
fn fill_numeric(column: &mut Column, statistic: f64) {
    let integral = statistic.fract() == 0.0 && statistic.abs() < 9.0e15;
    if column.kind() == ColumnType::BigInt && integral {
        fill_value(column, &Value::Integer(statistic as i64));
    } else {
        for value in column.values.iter_mut() {
            if let Value::Integer(integer) = value {
                *value = Value::Double(*integer as f64);
            }
        }
        fill_value(column, &Value::Double(statistic));
    }
}

fn fill_value(column: &mut Column, fill: &Value) {
    for value in column.values.iter_mut().filter(|value| value.is_missing()) {
        *value = fill.clone();
    }
}
