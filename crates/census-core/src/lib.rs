//! Census standardization engine.
//!
//! Ties the pipeline crates together behind one service:
//!
//! - **Engine** (`engine`): upload, standardize, resolve, bulk fix, submit
//! - **Ledger** (`ledger`): outstanding issues with the fix-queue and grouped projections
//! - **Workflow** (`workflow`): census status transitions
//! - **Gate** (`gate`): the submission decision
//! - **Stores** (`store`): collaborator traits, in-memory and JSON-directory backends
//!
//! # Error Handling
//!
//! Operations return the unified [`CensusError`]; errors from the pipeline
//! crates convert into it with `?`. No error path reports a complete census
//! while issues remain.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use census_core::{CensusEngine, Collaborators, EngineOptions, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::new());
//! let engine = CensusEngine::new(Collaborators::shared(store), EngineOptions::default())?;
//! let outcome = engine.upload_census(&quote, "census.csv", &bytes)?;
//! if !outcome.run.is_complete() {
//!     engine.apply_bulk_fix(&quote, CanonicalField::Gender, "female", "F", true)?;
//! }
//! engine.submit_quote(&quote)?;
//! ```

pub mod artifact;
pub mod engine;
pub mod error;
pub mod gate;
pub mod ledger;
pub mod options;
pub mod state;
pub mod store;
pub mod workflow;

pub use error::{CensusError, Result, StoreError};

pub use artifact::{StandardizedCensus, artifact_name};
pub use engine::{BulkFixOutcome, CensusEngine, Collaborators, UploadOutcome};
pub use gate::{GateBlock, GateDecision};
pub use ledger::{IssueEdit, IssueGroup, IssueLedger, QueueEntry};
pub use options::EngineOptions;
pub use state::CensusState;
pub use store::{
    CensusRepository, DirLock, FileStore, JsonDirStore, MemoryStore, NetworkAssigner,
    QUOTE_SUBMITTED, QuoteStore,
};
pub use workflow::{WorkflowEvent, transition};
