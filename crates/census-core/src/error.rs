//! Error types for the census engine.

use std::path::PathBuf;

use thiserror::Error;

use census_ingest::IngestError;
use census_map::MappingError;
use census_model::{CensusStatus, ModelError};
use census_standards::StandardsError;
use census_transform::BulkFixError;
use census_validate::ValidationFault;

/// Failure of a collaborator store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("failed to encode {what}: {message}")]
    Encode { what: String, message: String },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("{service} rejected the request: {message}")]
    Rejected { service: String, message: String },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Unified error for engine operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CensusError {
    // =========================================================================
    // OPERATOR-FACING
    // =========================================================================
    /// The uploaded file could not be parsed; nothing was stored.
    #[error("census file rejected: {0}")]
    FileParse(#[from] IngestError),

    /// Submission attempted without any census upload.
    #[error("no census has been uploaded for quote {quote}")]
    NoCensus { quote: String },

    /// Submission attempted while issues remain after a resolve pass.
    #[error("{remaining} census issue(s) must be resolved before submitting")]
    UnresolvedIssues { remaining: usize },

    #[error("upload {upload} not found for quote {quote}")]
    UploadNotFound { quote: String, upload: String },

    #[error("issue #{index} not found ({len} issue(s) outstanding)")]
    IssueNotFound { index: usize, len: usize },

    #[error("invalid bulk fix: {0}")]
    InvalidBulkFix(#[from] BulkFixError),

    #[error("invalid header mapping: {0}")]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Model(#[from] ModelError),

    // =========================================================================
    // ENGINE
    // =========================================================================
    /// Rule evaluation failed; the census was recorded as needing review.
    #[error("validation fault: {0}")]
    Validation(#[from] ValidationFault),

    #[error("census status cannot move from {from} on {event}")]
    IllegalTransition { from: CensusStatus, event: String },

    #[error("field catalog unavailable: {0}")]
    Standards(#[from] StandardsError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, CensusError>;

impl CensusError {
    /// Whether an operator can fix the cause and retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FileParse(_)
                | Self::NoCensus { .. }
                | Self::UnresolvedIssues { .. }
                | Self::UploadNotFound { .. }
                | Self::IssueNotFound { .. }
                | Self::InvalidBulkFix(_)
                | Self::Mapping(_)
                | Self::Model(_)
        )
    }

    /// A user-facing hint for fixing this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::FileParse(_) => {
                Some("Upload the census as .csv, .xls or .xlsx with a header row.")
            }
            Self::NoCensus { .. } => Some("Upload a census file before submitting the quote."),
            Self::UnresolvedIssues { .. } => {
                Some("Correct the remaining census issues, then run resolve again.")
            }
            Self::UploadNotFound { .. } => Some("List the quote's uploads to find a valid id."),
            Self::IssueNotFound { .. } => Some("Re-list issues; the ledger changed since."),
            Self::InvalidBulkFix(_) => Some("Both the source and target value must be non-empty."),
            Self::Mapping(_) => Some("Map fields only to headers present in the current census."),
            Self::Validation(_) => {
                Some("Review the header mapping; the census was marked Needs Review.")
            }
            _ => None,
        }
    }
}
