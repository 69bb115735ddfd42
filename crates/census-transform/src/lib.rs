//! Census value transformation.
//!
//! - **normalize**: per-field value rewrites applied to every cell before validation
//! - **bulk**: operator-driven `(field, source, target)` fixes that extend the
//!   value mappings and back-fill corrections on outstanding issues

pub mod bulk;
pub mod error;
pub mod normalize;

pub use bulk::BulkFix;
pub use error::BulkFixError;
pub use normalize::{normalize_value, resolve_value};
