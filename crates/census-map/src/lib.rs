//! Header aliasing for census uploads.
//!
//! Maps raw spreadsheet headers to [`CanonicalField`]s:
//!
//! - **Auto-detection** ([`HeaderAliaser::map_headers`]): normalize headers and
//!   catalog aliases (lowercase, alphanumerics only), prefer exact matches,
//!   fall back to substring matches. First header in upload order wins.
//! - **Operator choices** ([`apply_operator_mapping`]): validated against the
//!   current headers and always win over auto-detection. Fields that are
//!   already mapped are never re-detected, so choices stick across re-runs.
//! - **Candidates** ([`HeaderAliaser::candidates`]): Jaro-Winkler ranking of
//!   unused headers for a field left unmapped. Advisory only.
//!
//! [`CanonicalField`]: census_model::CanonicalField

mod aliaser;
mod error;
mod manual;
mod score;
mod utils;

pub use aliaser::{AliasMatch, HeaderAliaser, MatchKind};
pub use error::MappingError;
pub use manual::apply_operator_mapping;
pub use score::HeaderCandidate;
pub use utils::normalize_header_key;
