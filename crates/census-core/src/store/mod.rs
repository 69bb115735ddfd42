//! Collaborator interfaces and their stock implementations.
//!
//! The engine owns none of its storage. Uploaded files, quote records, the
//! network-assignment service and the persisted census state all sit behind
//! the traits below.
//!
//! - [`MemoryStore`]: everything in process memory, for tests and embedding
//! - [`JsonDirStore`]: JSON and raw files under one directory, for the CLI

mod json_dir;
mod memory;

pub use json_dir::{DirLock, JsonDirStore};
pub use memory::MemoryStore;

use census_model::{QuoteId, UploadId, UploadKind, UploadRecord};

use crate::artifact::StandardizedCensus;
use crate::error::StoreError;
use crate::state::CensusState;

/// Status the quote store records once the gate passes.
pub const QUOTE_SUBMITTED: &str = "Quote Submitted";

/// File storage for uploads.
pub trait FileStore: Send + Sync {
    fn store(
        &self,
        quote: &QuoteId,
        filename: &str,
        kind: UploadKind,
        bytes: &[u8],
    ) -> Result<UploadRecord, StoreError>;

    fn delete(&self, upload: &UploadId) -> Result<(), StoreError>;

    /// The quote's uploads in upload order.
    fn list(&self, quote: &QuoteId) -> Result<Vec<UploadRecord>, StoreError>;

    fn read(&self, upload: &UploadId) -> Result<Vec<u8>, StoreError>;
}

/// Quote persistence, used only to flip the quote status.
pub trait QuoteStore: Send + Sync {
    fn update_status(&self, quote: &QuoteId, status: &str) -> Result<(), StoreError>;

    fn status(&self, quote: &QuoteId) -> Result<Option<String>, StoreError>;
}

/// Downstream consumer of a submitted, standardized census.
pub trait NetworkAssigner: Send + Sync {
    fn assign(&self, quote: &QuoteId, census: &StandardizedCensus) -> Result<(), StoreError>;
}

/// Persistence of per-quote census state.
pub trait CensusRepository: Send + Sync {
    fn load(&self, quote: &QuoteId) -> Result<Option<CensusState>, StoreError>;

    fn save(&self, quote: &QuoteId, state: &CensusState) -> Result<(), StoreError>;

    fn remove(&self, quote: &QuoteId) -> Result<(), StoreError>;
}
