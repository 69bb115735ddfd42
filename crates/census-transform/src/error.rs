use thiserror::Error;

/// Rejected bulk-fix request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BulkFixError {
    #[error("bulk fix for {field} needs a non-empty source value")]
    EmptySource { field: String },

    #[error("bulk fix for {field} needs a non-empty target value")]
    EmptyTarget { field: String },
}
