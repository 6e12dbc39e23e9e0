//! The state of one user's interaction: the table as uploaded and its cleaned form.
use crate::cleaning::Command;
use crate::error::ParseError;
use crate::export::export_csv;
use crate::metrics::metrics;
use crate::metrics::Metrics;
use crate::spreadsheet::ingest_with;
use crate::spreadsheet::IngestOptions;
use crate::table::Table;
use thiserror::Error;
use tracing::debug;
use tracing::info;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No file has been loaded")]
    NotLoaded,

    #[error(transparent)]
    ParseError(#[from] ParseError),
}

/// Holds exactly one live table once a file has been loaded.
///
/// The first successful upload initializes the session; later uploads are
/// parsed but never replace the live table until [`Session::reset`] is called.
/// Every [`Command`] replaces the live table with its output.
#[derive(Debug, Default)]
pub struct Session {
    options: IngestOptions,
    original: Option<Table>,
    current: Option<Table>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: IngestOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Parses an upload and, if the session is empty, makes it the live table.
    /// A parse failure leaves the session untouched.
    pub fn load(&mut self, bytes: &[u8], file_name: &str) -> Result<&Table, ParseError> {
        let table = ingest_with(bytes, file_name, &self.options)?;
        if self.current.is_some() {
            debug!(file_name, "Session already holds a table, keeping it");
        } else {
            info!(file_name, "Session initialized");
            self.original = Some(table.clone());
        }
        let current: &Table = self.current.get_or_insert(table);
        Ok(current)
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    /// The live table.
    pub fn current(&self) -> Option<&Table> {
        self.current.as_ref()
    }

    /// The table as first uploaded.
    pub fn original(&self) -> Option<&Table> {
        self.original.as_ref()
    }

    fn require(&self) -> Result<&Table, SessionError> {
        self.current.as_ref().ok_or(SessionError::NotLoaded)
    }

    /// Replaces the live table with the command's output.
    pub fn apply(&mut self, command: Command) -> Result<&Table, SessionError> {
        let cleaned = command.apply(self.require()?);
        let current: &Table = self.current.insert(cleaned);
        Ok(current)
    }

    pub fn metrics(&self) -> Result<Metrics, SessionError> {
        Ok(metrics(self.require()?))
    }

    /// First `rows` rows of the live table.
    pub fn preview(&self, rows: usize) -> Result<Table, SessionError> {
        Ok(self.require()?.head(rows))
    }

    pub fn export_csv(&self) -> Result<Vec<u8>, SessionError> {
        Ok(export_csv(self.require()?))
    }

    /// Restores the table as first uploaded.
    pub fn revert(&mut self) -> Result<&Table, SessionError> {
        let original = self.original.clone().ok_or(SessionError::NotLoaded)?;
        info!("Session reverted to the uploaded table");
        let current: &Table = self.current.insert(original);
        Ok(current)
    }

    /// Forgets the loaded table so another file can be loaded.
    pub fn reset(&mut self) {
        self.original = None;
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::FillMethod;
    use crate::table::Value;

    const SCENARIO: &[u8] = b"x,y\na,1\nb,\na,1\n";

    #[test]
    fn empty_session_rejects_commands() {
        let mut session = Session::new();
        assert!(!session.is_loaded());
        assert!(matches!(session.apply(Command::RemoveDuplicates), Err(SessionError::NotLoaded)));
        assert!(matches!(session.metrics(), Err(SessionError::NotLoaded)));
        assert!(matches!(session.export_csv(), Err(SessionError::NotLoaded)));
    }

    #[test]
    fn commands_replace_current_table() {
        let mut session = Session::new();
        session.load(SCENARIO, "data.csv").unwrap();
        assert_eq!(session.metrics().unwrap().duplicate_count, 1);

        let cleaned = session.apply(Command::RemoveDuplicates).unwrap();
        assert_eq!(cleaned.row_count(), 2);
        assert_eq!(session.current().unwrap().row_count(), 2);
        assert_eq!(session.original().unwrap().row_count(), 3);

        session.apply(Command::FillMissing(FillMethod::Mean)).unwrap();
        assert_eq!(session.metrics().unwrap().total_missing(), 0);
        assert_eq!(session.export_csv().unwrap(), b"x,y\na,1\nb,1\n");
    }

    #[test]
    fn failed_upload_keeps_state() {
        let mut session = Session::new();
        assert!(session.load(&[0xc3, 0x28, 0xff], "garbage.csv").is_err());
        assert!(!session.is_loaded());

        session.load(SCENARIO, "data.csv").unwrap();
        session.apply(Command::RemoveMissing).unwrap();
        let before = session.current().cloned();
        assert!(session.load(&[0xc3, 0x28, 0xff], "garbage.csv").is_err());
        assert_eq!(session.current().cloned(), before);
    }

    #[test]
    fn later_uploads_do_not_replace_live_table() {
        let mut session = Session::new();
        session.load(SCENARIO, "data.csv").unwrap();
        let kept = session.load(b"z\n9\n", "other.csv").unwrap();
        assert_eq!(kept.column_names(), vec!["x", "y"]);

        session.reset();
        let loaded = session.load(b"z\n9\n", "other.csv").unwrap();
        assert_eq!(loaded.column("z").unwrap().values(), &[Value::Integer(9)]);
    }

    #[test]
    fn revert_restores_upload() {
        let mut session = Session::new();
        session.load(SCENARIO, "data.csv").unwrap();
        session.apply(Command::RemoveMissing).unwrap();
        let reverted = session.revert().unwrap();
        assert_eq!(reverted.row_count(), 3);
        assert_eq!(session.preview(2).unwrap().row_count(), 2);
    }
}
