//! # Spreadsheet Module
//!
//! Turns an uploaded byte stream into a [`Table`]. The filename extension picks
//! the reader (`.csv` or `.xlsx`, case-insensitive); every failure surfaces as a
//! single [`ParseError`] naming the file.
//!
//! Both readers share the same conventions:
//!
//! - the first row is the header; blank names become `Unnamed: {index}` and
//!   repeated names get a `.1`, `.2`, ... suffix
//! - cells matching a missing-value token (empty, `NA`, `NaN`, `#N/A`, `null`, ...)
//!   become [`Value::Missing`]
//! - a numeric column mixing integers and doubles is promoted to doubles
pub(crate) mod cell;
pub(crate) mod delimited;
pub(crate) mod reference;
pub(crate) mod sheet;
pub(crate) mod xlsx;

use crate::error::ParseError;
use crate::error::RustyCleanerError;
use crate::table::Column;
use crate::table::Table;
use crate::table::Value;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::debug;
use tracing::info;

/// Reasons an upload cannot be read.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Unsupported file format '{0}', expected csv or xlsx")]
    UnsupportedFormatError(String),

    #[error("No columns to parse from file")]
    EmptyDataError,

    #[error("File content is not valid {0}")]
    EncodingError(String),

    #[error("Expected {expected} fields in line {line}, saw {actual}")]
    RecordWidthError {
        line: u64,
        expected: usize,
        actual: usize,
    },

    #[error("Workbook part '{0}' not found")]
    MissingPartError(String),

    #[error("Workbook contains no worksheet")]
    NoWorksheetError,

    #[error("Invalid value at {0}: {1}")]
    CellValueError(String, String),
}

/// Tokens read as missing values, in addition to any configured ones.
pub const DEFAULT_NA_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// File formats accepted for upload.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SpreadsheetFormat {
    Csv,
    Xlsx,
}

impl SpreadsheetFormat {
    /// Detects the format from the filename extension.
    pub fn from_file_name(file_name: &str) -> Result<Self, SpreadsheetError> {
        let extension = Path::new(file_name)
            .extension()
            .map(|extension| extension.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            _ => Err(SpreadsheetError::UnsupportedFormatError(extension)),
        }
    }
}

/// Knobs for reading uploads.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IngestOptions {
    /// Extra tokens to read as missing values
    pub extra_na_values: Vec<String>,
}

impl IngestOptions {
    /// Returns true if the text is a missing-value token.
    pub fn is_na(&self, text: &str) -> bool {
        DEFAULT_NA_VALUES.contains(&text) || self.extra_na_values.iter().any(|token| token == text)
    }
}

/// Header and column-major values as produced by a reader, before naming is settled.
#[derive(Debug, Default)]
pub(crate) struct RawTable {
    pub(crate) header: Vec<Option<String>>,
    pub(crate) columns: Vec<Vec<Value>>,
}

impl RawTable {
    fn into_table(self) -> Result<Table, RustyCleanerError> {
        let columns = normalize_headers(self.header)
            .into_iter()
            .zip(self.columns)
            .map(|(name, values)| {
                let mut column = Column::new(name, values);
                column.normalize();
                column
            })
            .collect();
        Ok(Table::new(columns)?)
    }
}

/// Names blank headers `Unnamed: {index}` and suffixes repeated names until unique.
fn normalize_headers(header: Vec<Option<String>>) -> Vec<String> {
    let mut seen = HashSet::<String>::new();
    header
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let name = name.unwrap_or_else(|| format!("Unnamed: {index}"));
            let mut candidate = name.to_owned();
            let mut suffix = 0usize;
            while seen.contains(&candidate) {
                suffix += 1;
                candidate = format!("{name}.{suffix}");
            }
            seen.insert(candidate.to_owned());
            candidate
        })
        .collect()
}

/// Parses an upload with default options.
pub fn ingest(bytes: &[u8], file_name: &str) -> Result<Table, ParseError> {
    ingest_with(bytes, file_name, &IngestOptions::default())
}

/// Parses an upload; the extension of `file_name` selects the reader.
pub fn ingest_with(bytes: &[u8], file_name: &str, options: &IngestOptions) -> Result<Table, ParseError> {
    let wrap = |error: RustyCleanerError| ParseError::new(file_name, error);
    let format = SpreadsheetFormat::from_file_name(file_name).map_err(|error| wrap(error.into()))?;
    debug!(file_name, ?format, bytes = bytes.len(), "Parsing upload");
    let raw = match format {
        SpreadsheetFormat::Csv => delimited::read(bytes, options),
        SpreadsheetFormat::Xlsx => xlsx::read(bytes, options),
    }
    .map_err(wrap)?;
    let table = raw.into_table().map_err(wrap)?;
    info!(
        file_name,
        rows = table.row_count(),
        columns = table.column_count(),
        "Loaded table"
    );
    Ok(table)
}
