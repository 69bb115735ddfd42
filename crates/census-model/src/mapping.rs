//! Header and value mappings carried between standardization runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{CanonicalField, ModelError};

/// Canonical field to raw uploaded header.
///
/// A raw header maps to at most one canonical field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderMapping(BTreeMap<CanonicalField, String>);

impl HeaderMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `field` to `header`, replacing the field's previous header.
    ///
    /// Fails when `header` already belongs to a different field.
    pub fn assign(
        &mut self,
        field: CanonicalField,
        header: impl Into<String>,
    ) -> Result<Option<String>, ModelError> {
        let header = header.into();
        if let Some(owner) = self.field_for_header(&header)
            && owner != field
        {
            return Err(ModelError::HeaderAlreadyMapped {
                header,
                field: owner.id().to_string(),
            });
        }
        Ok(self.0.insert(field, header))
    }

    pub fn remove(&mut self, field: CanonicalField) -> Option<String> {
        self.0.remove(&field)
    }

    pub fn header_for(&self, field: CanonicalField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn field_for_header(&self, header: &str) -> Option<CanonicalField> {
        self.0
            .iter()
            .find(|(_, mapped)| mapped.as_str() == header)
            .map(|(field, _)| *field)
    }

    pub fn contains_field(&self, field: CanonicalField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_header_used(&self, header: &str) -> bool {
        self.0.values().any(|mapped| mapped == header)
    }

    /// Drop entries whose header is not in `headers`, returning what was dropped.
    pub fn retain_headers(&mut self, headers: &[String]) -> Vec<(CanonicalField, String)> {
        let stale: Vec<CanonicalField> = self
            .0
            .iter()
            .filter(|(_, header)| !headers.iter().any(|present| present == *header))
            .map(|(field, _)| *field)
            .collect();
        stale
            .into_iter()
            .filter_map(|field| self.0.remove(&field).map(|header| (field, header)))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &str)> {
        self.0.iter().map(|(field, header)| (*field, header.as_str()))
    }

    /// Canonical fields with no header, in catalog order.
    pub fn unmapped_fields(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .into_iter()
            .filter(|field| !self.0.contains_key(field))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Lookup key for a raw cell value: trimmed and case-folded.
pub fn normalize_value_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Raw value to corrected value for one canonical field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueMapping(BTreeMap<String, String>);

impl ValueMapping {
    pub fn get(&self, raw: &str) -> Option<&str> {
        self.0.get(&normalize_value_key(raw)).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Value mappings for every field that has any.
///
/// Entries are sanitized on the way in, including on deserialization: keys are
/// trimmed and case-folded, targets trimmed (and upper-cased for short-code
/// fields), and pairs with an empty side are discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<CanonicalField, BTreeMap<String, String>>",
    into = "BTreeMap<CanonicalField, BTreeMap<String, String>>"
)]
pub struct ValueMappings(BTreeMap<CanonicalField, ValueMapping>);

impl ValueMappings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `source -> target` for `field`. Returns false when either side is blank.
    pub fn insert(&mut self, field: CanonicalField, source: &str, target: &str) -> bool {
        let key = normalize_value_key(source);
        let target = canonical_target(field, target);
        if key.is_empty() || target.is_empty() {
            return false;
        }
        self.0.entry(field).or_default().0.insert(key, target);
        true
    }

    pub fn lookup(&self, field: CanonicalField, raw: &str) -> Option<&str> {
        self.0.get(&field).and_then(|mapping| mapping.get(raw))
    }

    pub fn for_field(&self, field: CanonicalField) -> Option<&ValueMapping> {
        self.0.get(&field)
    }

    /// Merge `other` into `self`; entries from `other` win.
    pub fn merge(&mut self, other: &ValueMappings) {
        for (field, mapping) in &other.0 {
            for (source, target) in mapping.iter() {
                self.insert(*field, source, target);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &ValueMapping)> {
        self.0.iter().map(|(field, mapping)| (*field, mapping))
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(ValueMapping::is_empty)
    }
}

fn canonical_target(field: CanonicalField, target: &str) -> String {
    let trimmed = target.trim();
    if field.is_code_field() {
        trimmed.to_uppercase()
    } else {
        trimmed.to_string()
    }
}

impl From<BTreeMap<CanonicalField, BTreeMap<String, String>>> for ValueMappings {
    fn from(raw: BTreeMap<CanonicalField, BTreeMap<String, String>>) -> Self {
        let mut mappings = ValueMappings::new();
        for (field, entries) in raw {
            for (source, target) in entries {
                mappings.insert(field, &source, &target);
            }
        }
        mappings
    }
}

impl From<ValueMappings> for BTreeMap<CanonicalField, BTreeMap<String, String>> {
    fn from(mappings: ValueMappings) -> Self {
        mappings
            .0
            .into_iter()
            .filter(|(_, mapping)| !mapping.is_empty())
            .map(|(field, mapping)| (field, mapping.0))
            .collect()
    }
}
