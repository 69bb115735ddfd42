use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use census_model::{QuoteId, UploadId, UploadKind, UploadRecord};

use super::{CensusRepository, FileStore, NetworkAssigner, QuoteStore};
use crate::artifact::StandardizedCensus;
use crate::error::StoreError;
use crate::state::CensusState;

#[derive(Debug, Default)]
struct Inner {
    uploads: Vec<(UploadRecord, Vec<u8>)>,
    next_upload: u64,
    states: HashMap<QuoteId, CensusState>,
    quote_status: HashMap<QuoteId, String>,
    assignments: Vec<(QuoteId, StandardizedCensus)>,
}

/// In-memory implementation of every collaborator.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Censuses handed to the network-assignment service, oldest first.
    pub fn assignments(&self) -> Vec<(QuoteId, StandardizedCensus)> {
        self.lock().assignments.clone()
    }
}

impl FileStore for MemoryStore {
    fn store(
        &self,
        quote: &QuoteId,
        filename: &str,
        kind: UploadKind,
        bytes: &[u8],
    ) -> Result<UploadRecord, StoreError> {
        let mut inner = self.lock();
        inner.next_upload += 1;
        let id = UploadId::new(format!("upload-{}", inner.next_upload)).map_err(|err| {
            StoreError::Rejected {
                service: "file store".to_string(),
                message: err.to_string(),
            }
        })?;
        let record = UploadRecord {
            id,
            quote_id: quote.clone(),
            filename: filename.to_string(),
            kind,
            size_bytes: bytes.len() as u64,
            uploaded_at: Utc::now(),
        };
        inner.uploads.push((record.clone(), bytes.to_vec()));
        Ok(record)
    }

    fn delete(&self, upload: &UploadId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let before = inner.uploads.len();
        inner.uploads.retain(|(record, _)| &record.id != upload);
        if inner.uploads.len() == before {
            return Err(StoreError::NotFound {
                what: format!("upload {upload}"),
            });
        }
        Ok(())
    }

    fn list(&self, quote: &QuoteId) -> Result<Vec<UploadRecord>, StoreError> {
        Ok(self
            .lock()
            .uploads
            .iter()
            .filter(|(record, _)| &record.quote_id == quote)
            .map(|(record, _)| record.clone())
            .collect())
    }

    fn read(&self, upload: &UploadId) -> Result<Vec<u8>, StoreError> {
        self.lock()
            .uploads
            .iter()
            .find(|(record, _)| &record.id == upload)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| StoreError::NotFound {
                what: format!("upload {upload}"),
            })
    }
}

impl QuoteStore for MemoryStore {
    fn update_status(&self, quote: &QuoteId, status: &str) -> Result<(), StoreError> {
        self.lock()
            .quote_status
            .insert(quote.clone(), status.to_string());
        Ok(())
    }

    fn status(&self, quote: &QuoteId) -> Result<Option<String>, StoreError> {
        Ok(self.lock().quote_status.get(quote).cloned())
    }
}

impl NetworkAssigner for MemoryStore {
    fn assign(&self, quote: &QuoteId, census: &StandardizedCensus) -> Result<(), StoreError> {
        self.lock()
            .assignments
            .push((quote.clone(), census.clone()));
        Ok(())
    }
}

impl CensusRepository for MemoryStore {
    fn load(&self, quote: &QuoteId) -> Result<Option<CensusState>, StoreError> {
        Ok(self.lock().states.get(quote).cloned())
    }

    fn save(&self, quote: &QuoteId, state: &CensusState) -> Result<(), StoreError> {
        self.lock().states.insert(quote.clone(), state.clone());
        Ok(())
    }

    fn remove(&self, quote: &QuoteId) -> Result<(), StoreError> {
        self.lock().states.remove(quote);
        Ok(())
    }
}
