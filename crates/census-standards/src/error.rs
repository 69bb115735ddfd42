#![deny(unsafe_code)]

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StandardsError {
    #[error("failed to parse field catalog: {message}")]
    Parse { message: String },

    #[error("unknown field in catalog: {id}")]
    UnknownField { id: String },

    #[error("duplicate field in catalog: {id}")]
    DuplicateField { id: String },

    #[error("catalog is missing canonical field: {id}")]
    MissingField { id: String },

    #[error("field {id} has no aliases")]
    EmptyAliases { id: String },

    #[error("field {id} uses rule code_set without codes")]
    EmptyCodes { id: String },

    #[error("field {id} maps synonyms to '{code}', which is not one of its codes")]
    UnknownSynonymTarget { id: String, code: String },
}
