use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid quote id: {0:?}")]
    InvalidQuoteId(String),
    #[error("invalid upload id: {0:?}")]
    InvalidUploadId(String),
    #[error("unknown canonical field: {0}")]
    UnknownField(String),
    #[error("header '{header}' is already mapped to '{field}'")]
    HeaderAlreadyMapped { header: String, field: String },
    #[error("standardization run is inconsistent: {0}")]
    InconsistentRun(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
