//! Census row validation.
//!
//! Checks every row of a census against the canonical field rules:
//!
//! - **Presence**: every field needs a mapped column and a non-empty cell
//! - **Dates**: `dob` must be a calendar date in `MM/DD/YYYY` or `YYYY-MM-DD`
//! - **Zip**: exactly five digits
//! - **Code sets**: gender, relationship and enrollment tier must equal a code
//!
//! Failing cells carry a suggested correction in `mapped_value` when the
//! catalog or a reformatting rule can produce one.
//!
//! # Example
//!
//! ```ignore
//! use census_validate::{ValidationInput, validate};
//!
//! let report = validate(catalog, &ValidationInput {
//!     table: &table,
//!     mapping: &mapping,
//!     value_mappings: &value_mappings,
//!     corrections: &corrections,
//! })?;
//! println!("{} issues", report.len());
//! ```

pub mod checks;
mod error;
mod issue;
mod report;
mod validator;

pub use error::ValidationFault;
pub use issue::IssueKind;
pub use report::ValidationReport;
pub use validator::{ValidationInput, validate};
