//! Operator cell corrections.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::CanonicalField;

/// One corrected cell as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCorrection {
    pub row: usize,
    pub field: CanonicalField,
    pub value: String,
}

/// Corrected cell values keyed by `(row, field)`.
///
/// A correction replaces the uploaded cell on every later run until the
/// census is replaced. Row 0 and blank values are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CellCorrection>", into = "Vec<CellCorrection>")]
pub struct CellCorrections(BTreeMap<(usize, CanonicalField), String>);

impl CellCorrections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a correction. Returns false when it was rejected.
    pub fn set(&mut self, row: usize, field: CanonicalField, value: &str) -> bool {
        let value = value.trim();
        if row == 0 || value.is_empty() {
            return false;
        }
        self.0.insert((row, field), value.to_string());
        true
    }

    pub fn get(&self, row: usize, field: CanonicalField) -> Option<&str> {
        self.0.get(&(row, field)).map(String::as_str)
    }

    pub fn remove(&mut self, row: usize, field: CanonicalField) -> bool {
        self.0.remove(&(row, field)).is_some()
    }

    /// Drop corrections for rows past `row_count`.
    pub fn retain_rows(&mut self, row_count: usize) -> usize {
        let before = self.0.len();
        self.0.retain(|(row, _), _| *row <= row_count);
        before - self.0.len()
    }

    /// Drop every correction for `field`.
    pub fn clear_field(&mut self, field: CanonicalField) -> usize {
        let before = self.0.len();
        self.0.retain(|(_, owner), _| *owner != field);
        before - self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<CellCorrection>> for CellCorrections {
    fn from(entries: Vec<CellCorrection>) -> Self {
        let mut corrections = CellCorrections::new();
        for entry in entries {
            corrections.set(entry.row, entry.field, &entry.value);
        }
        corrections
    }
}

impl From<CellCorrections> for Vec<CellCorrection> {
    fn from(corrections: CellCorrections) -> Self {
        corrections
            .0
            .into_iter()
            .map(|((row, field), value)| CellCorrection { row, field, value })
            .collect()
    }
}
