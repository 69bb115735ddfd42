//! Fuzzy ranking of unmapped headers.
//!
//! Jaro-Winkler similarity between the normalized header and each normalized
//! alias; a header's score is its best alias score. Used only to suggest
//! headers to the operator, never to assign them.

use std::cmp::Ordering;

use rapidfuzz::distance::jaro_winkler;
use serde::Serialize;

use crate::utils::normalize_header_key;

/// Scores below this are not worth showing.
const MIN_SCORE: f32 = 0.6;

/// An unused header that might belong to a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderCandidate {
    pub header: String,
    /// Similarity to the closest alias, 0.0 to 1.0.
    pub score: f32,
    /// Normalized alias the score was computed against.
    pub alias: String,
}

impl HeaderCandidate {
    /// Score as a whole percentage, for display.
    pub fn percent(&self) -> u32 {
        (self.score * 100.0).round() as u32
    }
}

/// Rank `headers` against `aliases` (already normalized), best first.
///
/// Ties keep upload order.
pub(crate) fn rank_candidates(
    headers: &[&String],
    aliases: &[&str],
    limit: usize,
) -> Vec<HeaderCandidate> {
    let mut ranked: Vec<HeaderCandidate> = headers
        .iter()
        .filter_map(|header| best_alias(header, aliases))
        .filter(|candidate| candidate.score >= MIN_SCORE)
        .collect();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked.truncate(limit);
    ranked
}

fn best_alias(header: &str, aliases: &[&str]) -> Option<HeaderCandidate> {
    let key = normalize_header_key(header);
    if key.is_empty() {
        return None;
    }
    aliases
        .iter()
        .map(|alias| {
            let score = jaro_winkler::similarity(key.chars(), alias.chars()) as f32;
            (score, *alias)
        })
        .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal))
        .map(|(score, alias)| HeaderCandidate {
            header: header.to_string(),
            score,
            alias: alias.to_string(),
        })
}
