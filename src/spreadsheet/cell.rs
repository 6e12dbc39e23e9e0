use crate::error::RustyCleanerError;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::SpreadsheetError;
use crate::table::Value;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;

/// Types of cell data in workbook files.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values (true/false)
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as numbers from 1900 epoch
    NumberTime1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as numbers from 1904 epoch
    NumberTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values such as `#DIV/0!`
    Error,
}

impl CellType {
    /// Picks the date flavour matching what a number format displays.
    fn temporal(is_date: bool, is_time: bool, is_1904: bool) -> Self {
        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, false) => Self::NumberTime1900,
            (false, true, true) => Self::NumberTime1904,
            (false, false, _) => Self::Number,
        }
    }

    /// Maps built-in number format IDs to a cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(Self::temporal(true, true, is_1904)),
            "14" | "15" | "16" | "17" => Some(Self::temporal(true, false, is_1904)),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(Self::temporal(false, true, is_1904)),
            _ => None,
        }
    }

    /// Scans a custom number format code for date and time placeholders,
    /// ignoring quoted literals, escaped characters and bracketed sections.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_bracket = false;
        let mut is_date = false;
        let mut is_time = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' if !is_literal => is_escaped = true,

                '"' if !is_bracket => is_literal = !is_literal,
                _ if is_literal => (),

                '[' => is_bracket = true,
                ']' => is_bracket = false,
                _ if is_bracket => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }
        Self::temporal(is_date, is_time, is_1904)
    }

    fn is_1904(&self) -> bool {
        matches!(self, Self::NumberDateTime1904 | Self::NumberDate1904 | Self::NumberTime1904)
    }
}

/// Represents a single cell in a worksheet with position, type, and raw value.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell data type
    pub(crate) kind: CellType,
    /// Cell value as stored in the file
    pub(crate) value: String,
}

impl Cell {
    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    fn invalid(&self, message: String) -> SpreadsheetError {
        SpreadsheetError::CellValueError(self.reference(), message)
    }

    /// Converts the stored value into a table value.
    pub(crate) fn to_value(&self, shared_strings: &[String]) -> Result<Value, RustyCleanerError> {
        let value = match self.kind {
            CellType::Empty => Value::Missing,
            CellType::Boolean => Value::Boolean(self.value == "1" || self.value.eq_ignore_ascii_case("true")),
            CellType::Number => to_number(self.to_double()?),
            CellType::NumberDate1900 | CellType::NumberDate1904 => {
                Value::Text(self.to_datetime()?.format("%Y-%m-%d").to_string())
            }
            CellType::NumberDateTime1900 | CellType::NumberDateTime1904 => {
                Value::Text(self.to_datetime()?.format("%Y-%m-%d %H:%M:%S%.f").to_string())
            }
            CellType::NumberTime1900 | CellType::NumberTime1904 => {
                Value::Text(self.to_datetime()?.format("%H:%M:%S%.f").to_string())
            }
            CellType::IsoDateTime => Value::Text(self.value.replace('T', " ")),
            CellType::InlineString | CellType::Error => Value::Text(self.value.to_owned()),
            CellType::SharedString => {
                let index = self.value.parse::<usize>()?;
                let string = shared_strings
                    .get(index)
                    .ok_or_else(|| self.invalid(format!("shared string {index} does not exist")))?;
                Value::Text(string.to_owned())
            }
        };
        Ok(value)
    }

    fn to_double(&self) -> Result<f64, SpreadsheetError> {
        self.value
            .trim()
            .parse::<f64>()
            .map_err(|_| self.invalid(format!("parse '{}' to double failed", self.value)))
    }

    /// Converts a serial date number into a timestamp.
    /// Serial numbers below 60 in the 1900 system predate the Lotus 1-2-3 leap year bug.
    fn to_datetime(&self) -> Result<NaiveDateTime, SpreadsheetError> {
        let serial = self.to_double()?;
        let (epoch, offset) = if self.kind.is_1904() {
            (NaiveDate::from_ymd_opt(1904, 1, 1), 0)
        } else {
            (NaiveDate::from_ymd_opt(1899, 12, 30), if serial < 60.0 { 1 } else { 0 })
        };
        let milliseconds = (serial * 86_400_000f64).round();
        epoch
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .filter(|_| serial >= 0.0 && milliseconds < i64::MAX as f64)
            .and_then(|datetime| datetime.checked_add_signed(Duration::days(offset)))
            .and_then(|datetime| datetime.checked_add_signed(Duration::milliseconds(milliseconds as i64)))
            .ok_or_else(|| self.invalid(format!("'{}' is not a valid date serial", self.value)))
    }
}

/// Integral numbers within the exactly representable range become integers.
fn to_number(value: f64) -> Value {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        Value::Integer(value as i64)
    } else {
        Value::Double(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellType, value: &str) -> Cell {
        Cell {
            row: 1,
            col: 2,
            kind,
            value: value.to_owned(),
        }
    }

    #[test]
    fn custom_number_formats() {
        assert_eq!(CellType::parse_custom_number_format("yyyy-mm-dd", false), CellType::NumberDate1900);
        assert_eq!(CellType::parse_custom_number_format("hh:mm:ss", true), CellType::NumberTime1904);
        assert_eq!(CellType::parse_custom_number_format("m/d/yy h:mm", false), CellType::NumberDateTime1900);
        assert_eq!(CellType::parse_custom_number_format("0.00", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("[Red]0.00", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("0 \"days\"", false), CellType::Number);
    }

    #[test]
    fn builtin_number_formats() {
        assert_eq!(CellType::parse_builtin_number_format_id("14", false), Some(CellType::NumberDate1900));
        assert_eq!(CellType::parse_builtin_number_format_id("22", true), Some(CellType::NumberDateTime1904));
        assert_eq!(CellType::parse_builtin_number_format_id("2", false), None);
    }

    #[test]
    fn numbers() {
        assert_eq!(cell(CellType::Number, "3").to_value(&[]).unwrap(), Value::Integer(3));
        assert_eq!(cell(CellType::Number, "3.25").to_value(&[]).unwrap(), Value::Double(3.25));
        assert_eq!(cell(CellType::Number, "1E3").to_value(&[]).unwrap(), Value::Integer(1000));
        let error = cell(CellType::Number, "abc").to_value(&[]).unwrap_err();
        assert_eq!(error.to_string(), "Invalid value at C2: parse 'abc' to double failed");
    }

    #[test]
    fn dates() {
        assert_eq!(cell(CellType::NumberDate1900, "45292").to_value(&[]).unwrap(), Value::from("2024-01-01"));
        assert_eq!(cell(CellType::NumberDate1900, "1").to_value(&[]).unwrap(), Value::from("1900-01-01"));
        assert_eq!(cell(CellType::NumberDate1904, "0").to_value(&[]).unwrap(), Value::from("1904-01-01"));
        assert_eq!(
            cell(CellType::NumberDateTime1900, "45292.5").to_value(&[]).unwrap(),
            Value::from("2024-01-01 12:00:00")
        );
        assert_eq!(cell(CellType::NumberTime1900, "0.75").to_value(&[]).unwrap(), Value::from("18:00:00"));
        assert_eq!(cell(CellType::IsoDateTime, "2024-01-01T08:30:00").to_value(&[]).unwrap(), Value::from("2024-01-01 08:30:00"));
    }

    #[test]
    fn strings_and_booleans() {
        let shared = vec!["zero".to_owned(), "one".to_owned()];
        assert_eq!(cell(CellType::SharedString, "1").to_value(&shared).unwrap(), Value::from("one"));
        assert!(cell(CellType::SharedString, "5").to_value(&shared).is_err());
        assert_eq!(cell(CellType::Boolean, "1").to_value(&[]).unwrap(), Value::Boolean(true));
        assert_eq!(cell(CellType::Boolean, "0").to_value(&[]).unwrap(), Value::Boolean(false));
        assert_eq!(cell(CellType::Error, "#N/A").to_value(&[]).unwrap(), Value::from("#N/A"));
    }
}
