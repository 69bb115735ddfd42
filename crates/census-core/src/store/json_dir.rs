//! Directory-backed collaborators.
//!
//! # Layout
//!
//! ```text
//! <base_dir>/
//!   uploads/index.json       upload records, in upload order
//!   uploads/blobs/<n>.bin    raw bytes, located through the index
//!   census/<quote>.json      persisted census state
//!   quotes.json              quote status by quote id
//!   assignments/<quote>.json last census handed to network assignment
//!   .lock                    advisory lock held by one process at a time
//! ```
//!
//! The in-process mutex only orders threads of one process. Processes sharing
//! a directory take [`JsonDirStore::lock_exclusive`] for the whole command.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use census_model::{QuoteId, UploadId, UploadKind, UploadRecord};

use super::{CensusRepository, FileStore, NetworkAssigner, QuoteStore};
use crate::artifact::StandardizedCensus;
use crate::error::StoreError;
use crate::state::CensusState;

const STATE_VERSION: &str = "1";

#[derive(Debug, Default, Serialize, Deserialize)]
struct UploadIndex {
    next: u64,
    entries: Vec<IndexEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexEntry {
    record: UploadRecord,
    blob: String,
}

/// Census state with repository metadata.
#[derive(Debug, Serialize, Deserialize)]
struct StoredState {
    version: String,
    saved_at: DateTime<Utc>,
    state: CensusState,
}

#[derive(Serialize)]
struct StoredAssignment<'a> {
    assigned_at: DateTime<Utc>,
    census: &'a StandardizedCensus,
}

/// Exclusive hold on a store directory; released when dropped.
#[derive(Debug)]
pub struct DirLock {
    _file: File,
}

/// Every collaborator backed by files under one directory.
#[derive(Debug)]
pub struct JsonDirStore {
    base_dir: PathBuf,
    /// Serializes read-modify-write of the shared index files.
    write_lock: Mutex<()>,
}

impl JsonDirStore {
    /// Open a store rooted at `base_dir`, creating the directory tree.
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_dir = base_dir.into();
        for dir in [
            base_dir.join("uploads").join("blobs"),
            base_dir.join("census"),
            base_dir.join("assignments"),
        ] {
            fs::create_dir_all(&dir).map_err(|err| StoreError::io(&dir, err))?;
        }
        Ok(Self {
            base_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Wait until no other process holds the directory, then hold it.
    pub fn lock_exclusive(&self) -> Result<DirLock, StoreError> {
        let path = self.lock_path();
        let file = open_lock_file(&path)?;
        FileExt::lock_exclusive(&file).map_err(|err| StoreError::io(&path, err))?;
        debug!(path = %path.display(), "store directory locked");
        Ok(DirLock { _file: file })
    }

    /// Hold the directory if it is free; `None` while another holder has it.
    pub fn try_lock_exclusive(&self) -> Result<Option<DirLock>, StoreError> {
        let path = self.lock_path();
        let file = open_lock_file(&path)?;
        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => Ok(Some(DirLock { _file: file })),
            Err(err) if err.raw_os_error() == fs2::lock_contended_error().raw_os_error() => {
                Ok(None)
            }
            Err(err) => Err(StoreError::io(&path, err)),
        }
    }

    fn lock_path(&self) -> PathBuf {
        self.base_dir.join(".lock")
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn index_path(&self) -> PathBuf {
        self.base_dir.join("uploads").join("index.json")
    }

    fn blob_path(&self, blob: &str) -> PathBuf {
        self.base_dir.join("uploads").join("blobs").join(blob)
    }

    fn state_path(&self, quote: &QuoteId) -> PathBuf {
        self.base_dir
            .join("census")
            .join(format!("{}.json", quote.as_str()))
    }

    fn quotes_path(&self) -> PathBuf {
        self.base_dir.join("quotes.json")
    }

    fn load_index(&self) -> Result<UploadIndex, StoreError> {
        Ok(read_json(&self.index_path())?.unwrap_or_default())
    }
}

fn open_lock_file(path: &Path) -> Result<File, StoreError> {
    OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(|err| StoreError::io(path, err))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path).map_err(|err| StoreError::io(path, err))?;
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|err| StoreError::Decode {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value).map_err(|err| StoreError::Encode {
        what: path.display().to_string(),
        message: err.to_string(),
    })?;
    // Write beside the target, then rename, so readers never see half a file.
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, json).map_err(|err| StoreError::io(&staging, err))?;
    fs::rename(&staging, path).map_err(|err| StoreError::io(path, err))
}

fn not_found(upload: &UploadId) -> StoreError {
    StoreError::NotFound {
        what: format!("upload {upload}"),
    }
}

impl FileStore for JsonDirStore {
    fn store(
        &self,
        quote: &QuoteId,
        filename: &str,
        kind: UploadKind,
        bytes: &[u8],
    ) -> Result<UploadRecord, StoreError> {
        let _guard = self.lock();
        let mut index = self.load_index()?;
        index.next += 1;
        let blob = format!("{}.bin", index.next);
        let id = UploadId::new(format!("upload-{}", index.next)).map_err(|err| {
            StoreError::Rejected {
                service: "file store".to_string(),
                message: err.to_string(),
            }
        })?;

        let blob_path = self.blob_path(&blob);
        fs::write(&blob_path, bytes).map_err(|err| StoreError::io(&blob_path, err))?;

        let record = UploadRecord {
            id,
            quote_id: quote.clone(),
            filename: filename.to_string(),
            kind,
            size_bytes: bytes.len() as u64,
            uploaded_at: Utc::now(),
        };
        index.entries.push(IndexEntry {
            record: record.clone(),
            blob,
        });
        write_json(&self.index_path(), &index)?;
        debug!(upload = %record.id, kind = kind.as_str(), "stored upload");
        Ok(record)
    }

    fn delete(&self, upload: &UploadId) -> Result<(), StoreError> {
        let _guard = self.lock();
        let mut index = self.load_index()?;
        let position = index
            .entries
            .iter()
            .position(|entry| &entry.record.id == upload)
            .ok_or_else(|| not_found(upload))?;
        let entry = index.entries.remove(position);
        write_json(&self.index_path(), &index)?;

        let blob_path = self.blob_path(&entry.blob);
        match fs::remove_file(&blob_path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::io(&blob_path, err)),
        }
    }

    fn list(&self, quote: &QuoteId) -> Result<Vec<UploadRecord>, StoreError> {
        Ok(self
            .load_index()?
            .entries
            .into_iter()
            .map(|entry| entry.record)
            .filter(|record| &record.quote_id == quote)
            .collect())
    }

    fn read(&self, upload: &UploadId) -> Result<Vec<u8>, StoreError> {
        let index = self.load_index()?;
        let entry = index
            .entries
            .iter()
            .find(|entry| &entry.record.id == upload)
            .ok_or_else(|| not_found(upload))?;
        let path = self.blob_path(&entry.blob);
        fs::read(&path).map_err(|err| StoreError::io(&path, err))
    }
}

impl QuoteStore for JsonDirStore {
    fn update_status(&self, quote: &QuoteId, status: &str) -> Result<(), StoreError> {
        let _guard = self.lock();
        let path = self.quotes_path();
        let mut statuses: BTreeMap<String, String> = read_json(&path)?.unwrap_or_default();
        statuses.insert(quote.as_str().to_string(), status.to_string());
        write_json(&path, &statuses)
    }

    fn status(&self, quote: &QuoteId) -> Result<Option<String>, StoreError> {
        let statuses: BTreeMap<String, String> =
            read_json(&self.quotes_path())?.unwrap_or_default();
        Ok(statuses.get(quote.as_str()).cloned())
    }
}

impl NetworkAssigner for JsonDirStore {
    fn assign(&self, quote: &QuoteId, census: &StandardizedCensus) -> Result<(), StoreError> {
        let path = self
            .base_dir
            .join("assignments")
            .join(format!("{}.json", quote.as_str()));
        write_json(
            &path,
            &StoredAssignment {
                assigned_at: Utc::now(),
                census,
            },
        )
    }
}

impl CensusRepository for JsonDirStore {
    fn load(&self, quote: &QuoteId) -> Result<Option<CensusState>, StoreError> {
        let stored: Option<StoredState> = read_json(&self.state_path(quote))?;
        Ok(stored.map(|stored| stored.state))
    }

    fn save(&self, quote: &QuoteId, state: &CensusState) -> Result<(), StoreError> {
        let stored = StoredState {
            version: STATE_VERSION.to_string(),
            saved_at: Utc::now(),
            state: state.clone(),
        };
        write_json(&self.state_path(quote), &stored)
    }

    fn remove(&self, quote: &QuoteId) -> Result<(), StoreError> {
        let path = self.state_path(quote);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::io(&path, err)),
        }
    }
}
