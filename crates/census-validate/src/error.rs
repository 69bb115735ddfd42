use thiserror::Error;

/// Rule evaluation could not run to completion.
///
/// A fault never means "no issues": callers must treat the census as
/// needing review.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFault {
    #[error("mapping sends {field} to header '{header}', which is not in the census")]
    HeaderNotInTable { field: String, header: String },

    #[error("row {row} has {found} cells but the census has {expected} headers")]
    RowWidth {
        row: usize,
        found: usize,
        expected: usize,
    },
}
