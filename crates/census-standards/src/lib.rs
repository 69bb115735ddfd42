//! Canonical census field catalog.
//!
//! The catalog is static configuration versioned with the engine: a TOML
//! document embedded at build time, parsed and validated once, then shared
//! read-only for the life of the process. Alternative documents can be loaded
//! with [`FieldCatalog::from_toml_str`] (tests, staged deployments), but a
//! loaded catalog never changes.

#![deny(unsafe_code)]

pub mod catalog;
pub mod error;

pub use crate::catalog::{FieldCatalog, FieldRule, FieldSpec, RuleKind};
pub use crate::error::StandardsError;
