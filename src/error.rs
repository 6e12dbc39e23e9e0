use thiserror::Error;

/// Main error type for the Rusty Cleaner crate.
/// Aggregates errors from various sources including standard library, dependencies, and internal modules.
#[derive(Error, Debug)]
pub enum RustyCleanerError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    ParseFloatError(#[from] std::num::ParseFloatError),

    #[error("{0}")]
    StringEncodingError(#[from] std::str::Utf8Error),

    // Third-party library errors
    #[error("{0}")]
    CsvError(#[from] csv::Error),

    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    // Table module errors
    #[error("{0}")]
    TableError(#[from] crate::table::TableError),
}

/// The single failure kind of file ingestion: the upload could not be decoded
/// as the format its name declares.
#[derive(Error, Debug)]
#[error("Error reading file '{file_name}': {source}")]
pub struct ParseError {
    /// Name of the uploaded file
    pub file_name: String,
    /// Underlying cause
    #[source]
    pub source: RustyCleanerError,
}

impl ParseError {
    pub(crate) fn new(file_name: &str, source: RustyCleanerError) -> Self {
        Self {
            file_name: file_name.to_owned(),
            source,
        }
    }
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, RustyCleanerError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| RustyCleanerError::WithContextError(format!("{}: {}", message, e)))
    }
}
