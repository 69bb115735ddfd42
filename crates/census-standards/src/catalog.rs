//! Field catalog loading and lookup.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use serde::Deserialize;

use census_model::{CanonicalField, normalize_value_key};

use crate::error::StandardsError;

const BUILTIN_CATALOG: &str = include_str!("../catalog/fields.toml");

static BUILTIN: OnceLock<Result<FieldCatalog, StandardsError>> = OnceLock::new();

/// Validation rule family for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Non-empty after trimming.
    Required,
    /// Calendar date in `MM/DD/YYYY` or `YYYY-MM-DD`.
    Date,
    /// Exactly five digits.
    Zip,
    /// One of a closed set of upper-case codes.
    CodeSet,
}

impl RuleKind {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Date => "date",
            Self::Zip => "zip",
            Self::CodeSet => "code_set",
        }
    }
}

/// Rule plus the codes a `code_set` rule accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub kind: RuleKind,
    pub codes: Vec<String>,
}

impl FieldRule {
    pub fn accepts_code(&self, value: &str) -> bool {
        self.codes.iter().any(|code| code == value)
    }
}

/// Catalog entry for one canonical field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub field: CanonicalField,
    pub label: String,
    pub rule: FieldRule,
    pub aliases: Vec<String>,
    /// Normalized synonym -> code.
    synonyms: BTreeMap<String, String>,
}

impl FieldSpec {
    /// Code a raw value is a known synonym of, if any.
    ///
    /// Used only to suggest corrections; the validator never applies it on
    /// its own.
    pub fn synonym_for(&self, raw: &str) -> Option<&str> {
        let key = normalize_value_key(raw);
        if let Some(code) = self.synonyms.get(&key) {
            return Some(code.as_str());
        }
        let upper = raw.trim().to_uppercase();
        self.rule
            .codes
            .iter()
            .find(|code| **code == upper)
            .map(String::as_str)
    }

    pub fn synonym_count(&self) -> usize {
        self.synonyms.len()
    }
}

/// Immutable catalog of every canonical field.
#[derive(Debug, Clone)]
pub struct FieldCatalog {
    version: String,
    /// Indexed by `CanonicalField::ordinal`.
    fields: Vec<FieldSpec>,
}

#[derive(Deserialize)]
struct CatalogDocument {
    version: String,
    fields: Vec<FieldDocument>,
}

#[derive(Deserialize)]
struct FieldDocument {
    id: String,
    label: String,
    rule: RuleKind,
    #[serde(default)]
    codes: Vec<String>,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    synonyms: BTreeMap<String, Vec<String>>,
}

impl FieldCatalog {
    /// The catalog shipped with this build, parsed on first use.
    pub fn builtin() -> Result<&'static FieldCatalog, StandardsError> {
        BUILTIN
            .get_or_init(|| FieldCatalog::from_toml_str(BUILTIN_CATALOG))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Parse and validate a catalog document.
    pub fn from_toml_str(source: &str) -> Result<Self, StandardsError> {
        let document: CatalogDocument =
            toml::from_str(source).map_err(|error| StandardsError::Parse {
                message: error.to_string(),
            })?;
        Self::from_document(document)
    }

    fn from_document(document: CatalogDocument) -> Result<Self, StandardsError> {
        let mut specs: BTreeMap<CanonicalField, FieldSpec> = BTreeMap::new();
        for entry in document.fields {
            let field = CanonicalField::parse(&entry.id).ok_or_else(|| {
                StandardsError::UnknownField {
                    id: entry.id.clone(),
                }
            })?;
            if specs.contains_key(&field) {
                return Err(StandardsError::DuplicateField { id: entry.id });
            }
            let spec = build_spec(field, entry)?;
            specs.insert(field, spec);
        }
        for field in CanonicalField::ALL {
            if !specs.contains_key(&field) {
                return Err(StandardsError::MissingField {
                    id: field.id().to_string(),
                });
            }
        }
        Ok(Self {
            version: document.version.trim().to_string(),
            fields: specs.into_values().collect(),
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Every field, in catalog order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, field: CanonicalField) -> &FieldSpec {
        &self.fields[field.ordinal()]
    }
}

fn build_spec(field: CanonicalField, entry: FieldDocument) -> Result<FieldSpec, StandardsError> {
    let id = field.id().to_string();
    let mut seen = BTreeSet::new();
    let aliases: Vec<String> = entry
        .aliases
        .into_iter()
        .map(|alias| alias.trim().to_string())
        .filter(|alias| !alias.is_empty() && seen.insert(alias.to_lowercase()))
        .collect();
    if aliases.is_empty() {
        return Err(StandardsError::EmptyAliases { id });
    }

    let codes: Vec<String> = entry
        .codes
        .iter()
        .map(|code| code.trim().to_uppercase())
        .filter(|code| !code.is_empty())
        .collect();
    if entry.rule == RuleKind::CodeSet && codes.is_empty() {
        return Err(StandardsError::EmptyCodes { id });
    }

    let mut synonyms = BTreeMap::new();
    for (code, raw_values) in entry.synonyms {
        let code = code.trim().to_uppercase();
        if !codes.contains(&code) {
            return Err(StandardsError::UnknownSynonymTarget { id, code });
        }
        for raw in raw_values {
            let key = normalize_value_key(&raw);
            if !key.is_empty() {
                synonyms.insert(key, code.clone());
            }
        }
    }

    Ok(FieldSpec {
        field,
        label: entry.label.trim().to_string(),
        rule: FieldRule {
            kind: entry.rule,
            codes,
        },
        aliases,
        synonyms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_covers_every_field() {
        let catalog = FieldCatalog::builtin().unwrap();
        assert!(!catalog.version().is_empty());
        assert_eq!(catalog.fields().len(), CanonicalField::ALL.len());
        for field in CanonicalField::ALL {
            assert_eq!(catalog.field(field).field, field);
        }
    }

    #[test]
    fn builtin_rules_match_field_contracts() {
        let catalog = FieldCatalog::builtin().unwrap();
        assert_eq!(
            catalog.field(CanonicalField::Dob).rule.kind,
            RuleKind::Date
        );
        assert_eq!(catalog.field(CanonicalField::Zip).rule.kind, RuleKind::Zip);
        assert_eq!(
            catalog.field(CanonicalField::Gender).rule.codes,
            vec!["M", "F"]
        );
        assert_eq!(
            catalog.field(CanonicalField::Relationship).rule.codes,
            vec!["E", "S", "C"]
        );
        assert_eq!(
            catalog.field(CanonicalField::EnrollmentTier).rule.codes,
            vec!["EE", "ES", "EC", "EF", "W"]
        );
        assert_eq!(
            catalog.field(CanonicalField::FirstName).rule.kind,
            RuleKind::Required
        );
    }

    #[test]
    fn synonyms_suggest_codes() {
        let catalog = FieldCatalog::builtin().unwrap();
        let gender = catalog.field(CanonicalField::Gender);
        assert_eq!(gender.synonym_for(" Female "), Some("F"));
        assert_eq!(gender.synonym_for("m"), Some("M"));
        assert_eq!(gender.synonym_for("unknown"), None);

        let tier = catalog.field(CanonicalField::EnrollmentTier);
        assert_eq!(tier.synonym_for("Family"), Some("EF"));
        assert_eq!(tier.synonym_for("waived"), Some("W"));
    }
}
