//! The closed set of canonical census columns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// A column every standardized census must carry.
///
/// The set is fixed at compile time. Declaration order is the catalog order,
/// which drives issue ordering and the standardized export column order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    FirstName,
    LastName,
    Dob,
    Zip,
    Gender,
    Relationship,
    EnrollmentTier,
}

impl CanonicalField {
    /// All canonical fields in catalog order.
    pub const ALL: [CanonicalField; 7] = [
        CanonicalField::FirstName,
        CanonicalField::LastName,
        CanonicalField::Dob,
        CanonicalField::Zip,
        CanonicalField::Gender,
        CanonicalField::Relationship,
        CanonicalField::EnrollmentTier,
    ];

    /// Stable identifier used in issues, mappings and the catalog.
    pub fn id(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Dob => "dob",
            Self::Zip => "zip",
            Self::Gender => "gender",
            Self::Relationship => "relationship",
            Self::EnrollmentTier => "enrollment_tier",
        }
    }

    /// Short-code fields whose corrected values are stored upper-cased.
    pub fn is_code_field(self) -> bool {
        matches!(
            self,
            Self::Gender | Self::Relationship | Self::EnrollmentTier
        )
    }

    /// Position in catalog order.
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Parse a field identifier, tolerating case and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|field| field.id() == key)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CanonicalField {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ModelError::UnknownField(s.to_string()))
    }
}
