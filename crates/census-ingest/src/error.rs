//! File parse errors.

use thiserror::Error;

/// A census file could not be turned into a table.
///
/// These are user-facing: the upload is rejected and nothing downstream runs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IngestError {
    #[error("unsupported file type for '{filename}' (expected .csv, .xls or .xlsx)")]
    UnsupportedFormat { filename: String },

    #[error("failed to read CSV '{filename}': {source}")]
    Csv {
        filename: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read spreadsheet '{filename}': {message}")]
    Workbook { filename: String, message: String },

    #[error("'{filename}' has no header row")]
    Empty { filename: String },

    #[error("failed to write standardized census: {message}")]
    Export { message: String },
}

impl IngestError {
    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::UnsupportedFormat { filename }
            | Self::Csv { filename, .. }
            | Self::Workbook { filename, .. }
            | Self::Empty { filename } => Some(filename),
            Self::Export { .. } => None,
        }
    }
}
