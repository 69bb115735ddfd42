//! Utility functions for mapping operations.

/// Normalizes a header or alias for comparison: lowercase, alphanumerics only.
///
/// `"Date of Birth"`, `"date_of_birth"` and `" DATE-OF-BIRTH "` all become
/// `"dateofbirth"`.
pub fn normalize_header_key(raw: &str) -> String {
    raw.chars()
        .filter(|ch| ch.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
