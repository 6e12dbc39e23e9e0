//! # Rusty Cleaner
//!
//! Interactive cleaning of tabular data uploads. A CSV or Excel (`.xlsx`) file
//! is parsed into a columnar [`Table`], inspected through quality [`Metrics`],
//! cleaned with a sequence of [`Command`]s and exported back to CSV.
//!
//! ## Features
//!
//! - **Ingestion**: UTF-8 CSV with type inference and pandas-style missing-value
//!   tokens; the first worksheet of `.xlsx` workbooks, dates included
//! - **Metrics**: shape, duplicate row count and missing values per column
//! - **Cleaning**: drop rows with missing values, fill them with the column
//!   mean, median or mode, drop duplicate rows
//! - **Session**: one live table per user that every command replaces
//! - **Export**: CSV without an index column, ready to download
//!
//! ## Example
//!
//! ```
//! use rusty_cleaner::{Command, FillMethod, Session};
//!
//! let mut session = Session::new();
//! session.load(b"x,y\na,1\nb,\na,1\n", "data.csv")?;
//! session.apply(Command::RemoveDuplicates)?;
//! session.apply(Command::FillMissing(FillMethod::Mean))?;
//! assert_eq!(session.export_csv()?, b"x,y\na,1\nb,1\n");
//! # Ok::<(), rusty_cleaner::SessionError>(())
//! ```
pub mod cleaning;
pub mod config;
pub mod error;
pub mod export;
pub mod metrics;
pub mod session;
pub mod spreadsheet;
pub mod table;

mod helpers;

pub use cleaning::fill_missing;
pub use cleaning::remove_duplicates;
pub use cleaning::remove_missing;
pub use cleaning::Command;
pub use cleaning::FillMethod;
pub use error::ParseError;
pub use error::RustyCleanerError;
pub use export::export_csv;
pub use export::EXPORT_FILE_NAME;
pub use export::EXPORT_MIME_TYPE;
pub use metrics::metrics;
pub use metrics::Metrics;
pub use session::Session;
pub use session::SessionError;
pub use spreadsheet::ingest;
pub use spreadsheet::ingest_with;
pub use spreadsheet::IngestOptions;
pub use table::Column;
pub use table::ColumnType;
pub use table::Table;
pub use table::Value;
