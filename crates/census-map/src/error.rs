//! Error types for mapping operations.

use thiserror::Error;

/// Errors from operator-driven mapping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MappingError {
    /// Header not present in the current upload.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Header already mapped to another field.
    #[error("Column '{column}' already mapped to '{field}'")]
    ColumnAlreadyUsed {
        /// The header that was already used.
        column: String,
        /// The field it is mapped to.
        field: String,
    },
}

impl MappingError {
    /// Get the header name associated with this error.
    pub fn column(&self) -> &str {
        match self {
            Self::ColumnNotFound(c) => c,
            Self::ColumnAlreadyUsed { column, .. } => column,
        }
    }
}
