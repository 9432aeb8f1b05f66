//! Spreadsheet I/O for the candidate list and the status table (CSV)

mod reader;
mod writer;

pub use reader::{read_candidates, read_status_table};
pub use writer::write_status_table;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} has no column named '{column}'")]
    MissingColumn { path: PathBuf, column: String },
}

pub type Result<T> = std::result::Result<T, TableError>;
