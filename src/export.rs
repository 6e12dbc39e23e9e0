//! CSV serialization of a table for download.
use crate::table::Table;
use csv::Terminator;
use csv::WriterBuilder;
use tracing::debug;

/// File name offered for the cleaned download.
pub const EXPORT_FILE_NAME: &str = "cleaned_data.csv";
/// Content type of the cleaned download.
pub const EXPORT_MIME_TYPE: &str = "text/csv";

/// Encodes the table as UTF-8 CSV: a header row of column names, then one line
/// per row, without an index column. Missing cells are empty fields.
pub fn export_csv(table: &Table) -> Vec<u8> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    if table.column_count() > 0 {
        write_records(&mut writer, table).expect("Write CSV into memory");
    }
    let bytes = writer.into_inner().expect("Flush CSV into memory");
    debug!(rows = table.row_count(), bytes = bytes.len(), "Exported table");
    bytes
}

fn write_records(writer: &mut csv::Writer<Vec<u8>>, table: &Table) -> csv::Result<()> {
    writer.write_record(table.column_names())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|value| value.to_string()))?;
    }
    Ok(())
}
