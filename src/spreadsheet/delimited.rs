//! Comma-separated text reader with per-column type inference.
use crate::error::RustyCleanerError;
use crate::spreadsheet::IngestOptions;
use crate::spreadsheet::RawTable;
use crate::spreadsheet::SpreadsheetError;
use crate::table::Value;
use csv::ReaderBuilder;
use encoding_rs::Encoding;
use encoding_rs::UTF_8;
use std::borrow::Cow;

/// Reads CSV bytes; the first record is the header.
///
/// Short records are padded with missing values, long records are rejected.
pub(super) fn read(bytes: &[u8], options: &IngestOptions) -> Result<RawTable, RustyCleanerError> {
    let text = decode(bytes)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record?,
        None => Err(SpreadsheetError::EmptyDataError)?,
    };
    let width = header.len();
    let header: Vec<Option<String>> = header
        .iter()
        .map(|name| Some(name.to_owned()).filter(|name| !name.trim().is_empty()))
        .collect();

    let mut fields: Vec<Vec<String>> = vec![Vec::new(); width];
    for record in records {
        let record = record?;
        if record.len() > width {
            Err(SpreadsheetError::RecordWidthError {
                line: record.position().map(|position| position.line()).unwrap_or_default(),
                expected: width,
                actual: record.len(),
            })?
        }
        for (index, column) in fields.iter_mut().enumerate() {
            column.push(record.get(index).unwrap_or_default().to_owned());
        }
    }

    let columns = fields
        .into_iter()
        .map(|column| infer_column(column, options))
        .collect();
    Ok(RawTable { header, columns })
}

/// Decodes UTF-8 text, honoring a UTF-8 or UTF-16 byte-order mark.
fn decode(bytes: &[u8]) -> Result<Cow<'_, str>, SpreadsheetError> {
    let (encoding, offset) = Encoding::for_bom(bytes).unwrap_or((UTF_8, 0));
    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[offset..])
        .ok_or_else(|| SpreadsheetError::EncodingError(encoding.name().to_owned()))
}

/// Types a column of raw fields: integers, then doubles, then booleans, else text.
fn infer_column(fields: Vec<String>, options: &IngestOptions) -> Vec<Value> {
    let cells: Vec<Option<String>> = fields
        .into_iter()
        .map(|field| Some(field).filter(|field| !options.is_na(field)))
        .collect();

    let integers: Option<Vec<Option<i64>>> = parse_all(&cells, |field| field.trim().parse::<i64>().ok());
    if let Some(integers) = integers {
        return integers.into_iter().map(Value::from).collect();
    }
    let doubles: Option<Vec<Option<f64>>> = parse_all(&cells, |field| {
        field.trim().parse::<f64>().ok().filter(|value| !value.is_nan())
    });
    if let Some(doubles) = doubles {
        return doubles.into_iter().map(Value::from).collect();
    }
    let booleans: Option<Vec<Option<bool>>> = parse_all(&cells, parse_boolean);
    if let Some(booleans) = booleans {
        return booleans.into_iter().map(Value::from).collect();
    }
    cells.into_iter().map(Value::from).collect()
}

/// Applies `parse` to every present field, failing as soon as one does not parse.
fn parse_all<T, F>(cells: &[Option<String>], parse: F) -> Option<Vec<Option<T>>>
where
    F: Fn(&str) -> Option<T>,
{
    cells
        .iter()
        .map(|cell| match cell {
            Some(field) => parse(field).map(Some),
            None => Some(None),
        })
        .collect()
}

fn parse_boolean(field: &str) -> Option<bool> {
    match field {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}
