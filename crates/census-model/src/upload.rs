use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{QuoteId, UploadId};

/// What a stored file is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadKind {
    /// Operator-provided census spreadsheet.
    Census,
    /// Engine-produced standardized census export.
    Standardized,
    /// Anything else attached to the quote.
    Supporting,
}

impl UploadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Census => "census",
            Self::Standardized => "standardized",
            Self::Supporting => "supporting",
        }
    }
}

/// A file held by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub id: UploadId,
    pub quote_id: QuoteId,
    pub filename: String,
    pub kind: UploadKind,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

impl UploadRecord {
    pub fn is_census(&self) -> bool {
        self.kind == UploadKind::Census
    }
}
