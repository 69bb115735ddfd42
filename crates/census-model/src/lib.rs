//! Data model for the census standardization engine.
//!
//! Every other census crate speaks in these types:
//!
//! - [`CanonicalField`]: the closed set of columns a standardized census carries
//! - [`HeaderMapping`]: canonical field to raw uploaded header
//! - [`ValueMappings`]: per-field raw value rewrites built by bulk fixes
//! - [`Issue`]: one data-quality finding for a row and field
//! - [`CellCorrections`]: operator-supplied cell values that outlive a run
//! - [`StandardizationRun`]: the persisted outcome of a validation pass
//! - [`UploadRecord`]: a stored file attached to a quote

#![deny(unsafe_code)]

pub mod correction;
pub mod error;
pub mod field;
pub mod ids;
pub mod issue;
pub mod mapping;
pub mod run;
pub mod status;
pub mod upload;

pub use correction::{CellCorrection, CellCorrections};
pub use error::{ModelError, Result};
pub use field::CanonicalField;
pub use ids::{QuoteId, UploadId};
pub use issue::{CENSUS_WIDE_FIELD, Issue};
pub use mapping::{HeaderMapping, ValueMapping, ValueMappings, normalize_value_key};
pub use run::{RunInputs, RunStatus, SampleRow, StandardizationRun};
pub use status::CensusStatus;
pub use upload::{UploadKind, UploadRecord};
